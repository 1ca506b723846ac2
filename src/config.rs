// Runtime configuration shared by the CLI and the server.
// Flags fall back to environment variables, then to built-in defaults.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Database file name used when no path is configured.
pub const DEFAULT_DB_FILE: &str = "world-catalog.db";

#[derive(Debug, Clone, Args)]
pub struct DatabaseArgs {
    /// Path to the SQLite database file (default: next to the executable)
    #[arg(long = "db", env = "WORLD_CATALOG_DB")]
    pub db_path: Option<PathBuf>,
}

impl DatabaseArgs {
    pub fn resolve(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }
}

/// `<directory of the running executable>/world-catalog.db`
pub fn default_db_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not determine executable path")?;
    let dir = exe
        .parent()
        .context("Executable path has no parent directory")?;
    Ok(dir.join(DEFAULT_DB_FILE))
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level. Output goes to stderr so stdout stays clean for CLI output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
