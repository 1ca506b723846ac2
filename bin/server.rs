// World Catalog - Web Server
// Startup: open store → create tables → seed reference data → serve.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use world_catalog::api::{prepare_database, router, AppState};
use world_catalog::config::{init_tracing, DatabaseArgs};
use world_catalog::StoragePlan;

#[derive(Parser)]
#[command(name = "world-server", about = "Read-only HTTP API over the world catalog")]
struct Cli {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Address to listen on
    #[arg(long, env = "WORLD_CATALOG_BIND", default_value = "0.0.0.0:3000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let plan = Arc::new(StoragePlan::world()?);
    let db_path = cli.database.resolve()?;

    // Seeding completes before the listener is bound; a failure aborts startup
    let report = prepare_database(db_path.clone(), Arc::clone(&plan)).await?;
    if report.is_noop() {
        tracing::info!("reference data already present");
    }
    tracing::info!(path = %db_path.display(), "database ready");

    for entity in plan.entities() {
        tracing::info!(entity = entity.entity, storage = %entity.storage, "mapped");
    }

    let app = router(AppState::new(db_path, plan));

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.bind))?;

    tracing::info!(addr = %cli.bind, "server running, API at /api/main/get-states");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
