use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use world_catalog::config::{init_tracing, DatabaseArgs};
use world_catalog::{seed_reference_data, SortOrder, StoragePlan, Store};

#[derive(Parser)]
#[command(name = "world-catalog", about = "World catalog database tool")]
struct Cli {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create tables and seed the reference regions and settlements
    Seed,

    /// Print the storage plan (schema.table and column names) as JSON
    Plan,

    /// List regions by name
    Regions {
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },

    /// List settlements with population and region code
    Settlements,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let plan = Arc::new(StoragePlan::world()?);

    match cli.command {
        Commands::Plan => {
            println!("{}", serde_json::to_string_pretty(plan.as_ref())?);
        }
        command => run_with_store(command, &cli.database, plan)?,
    }

    Ok(())
}

fn run_with_store(
    command: Commands,
    database: &DatabaseArgs,
    plan: Arc<StoragePlan>,
) -> Result<()> {
    let db_path = database.resolve()?;
    let mut store = Store::open(&db_path, plan)?;
    store.setup_database()?;

    match command {
        Commands::Seed => {
            let report = seed_reference_data(&mut store)?;
            println!(
                "Seeded {}: {} regions, {} settlements added",
                db_path.display(),
                report.regions_added,
                report.settlements_added
            );
            println!(
                "Totals: {} regions, {} settlements",
                store.count_regions()?,
                store.count_settlements()?
            );
        }
        Commands::Regions { desc } => {
            let order = if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            for region in store.list_regions(order)? {
                println!("{:<4} {:<20} {:>8}", region.code, region.name, region.balance);
            }
        }
        Commands::Settlements => {
            for s in store.list_settlement_summaries()? {
                println!(
                    "{:<20} {:>8} {}",
                    s.name,
                    s.population,
                    s.region_code.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Plan => {}
    }

    Ok(())
}
