// World Catalog - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod naming;
pub mod plan;
pub mod seed;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{SortOrder, StagedBatch, Store};
pub use entities::{Region, Settlement, SettlementSummary, Territory};
pub use naming::{
    compute_column_plan, compute_storage_name, normalize_identifier, ColumnMapping,
    EntityDescriptor, MemberDescriptor, MemberKind, NamingError, StorageName, DEFAULT_SCHEMA,
};
pub use plan::{Entity, EntityPlan, PlanBuilder, StoragePlan};
pub use seed::{seed_reference_data, SeedReport};
