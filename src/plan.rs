// 🗺️ Storage Plan
// Explicit registration of every entity with the collection it lives in.
// The resulting plan is what the database layer reads table and column
// names from, so the naming convention is declared once and applied
// everywhere.

use crate::entities::{Region, Settlement, Territory};
use crate::naming::{
    compute_column_plan, compute_storage_name, ColumnMapping, EntityDescriptor, NamingError,
    StorageName,
};
use serde::Serialize;

/// Implemented by every persisted type.
pub trait Entity {
    const DESCRIPTOR: EntityDescriptor;
}

// ============================================================================
// PLAN TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyPlan {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityPlan {
    pub entity: &'static str,
    pub storage: StorageName,
    pub columns: Vec<ColumnMapping>,
    pub foreign_keys: Vec<ForeignKeyPlan>,
}

impl EntityPlan {
    /// Storage column for a member, if the member maps to one.
    pub fn column_name(&self, member: &str) -> Result<&str, NamingError> {
        self.columns
            .iter()
            .find(|c| c.member == member)
            .map(|c| c.column.as_str())
            .ok_or_else(|| NamingError::UnknownMember {
                entity: self.entity.to_string(),
                member: member.to_string(),
            })
    }

    /// Quoted column identifier, ready to splice into SQL.
    pub fn col(&self, member: &str) -> Result<String, NamingError> {
        self.column_name(member).map(quote_ident)
    }

    /// Quoted table identifier. SQLite has no schemas, so only the table
    /// half of the storage name is physical.
    pub fn table_ident(&self) -> String {
        quote_ident(&self.storage.table)
    }

    pub fn create_table_sql(&self) -> String {
        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", quote_ident(&c.column), c.sql_type);
                if c.primary_key {
                    def.push_str(" PRIMARY KEY");
                } else if !c.nullable {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();

        for fk in &self.foreign_keys {
            defs.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                quote_ident(&fk.column),
                quote_ident(&fk.references_table),
                quote_ident(&fk.references_column),
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.table_ident(),
            defs.join(",\n    ")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoragePlan {
    entities: Vec<EntityPlan>,
}

impl StoragePlan {
    /// Plan for the world dataset: regions, settlements, territories.
    pub fn world() -> Result<Self, NamingError> {
        PlanBuilder::new()
            .register::<Region>("Regions")
            .register::<Settlement>("Settlements")
            .register::<Territory>("Territories")
            .build()
    }

    pub fn entity<E: Entity>(&self) -> Result<&EntityPlan, NamingError> {
        self.by_name(E::DESCRIPTOR.name)
    }

    pub fn by_name(&self, entity: &str) -> Result<&EntityPlan, NamingError> {
        self.entities
            .iter()
            .find(|p| p.entity == entity)
            .ok_or_else(|| NamingError::UnknownEntity(entity.to_string()))
    }

    /// Entities in registration order.
    pub fn entities(&self) -> &[EntityPlan] {
        &self.entities
    }
}

// ============================================================================
// PLAN BUILDER
// ============================================================================

#[derive(Default)]
pub struct PlanBuilder {
    registered: Vec<(EntityDescriptor, String)>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E` as exposed through `collection` on the aggregate root.
    /// The table name derives from the collection name, not the type name.
    pub fn register<E: Entity>(mut self, collection: &str) -> Self {
        self.registered.push((E::DESCRIPTOR, collection.to_string()));
        self
    }

    /// Compute names for every registered entity and resolve foreign keys.
    /// Register referenced entities before the entities that point at them
    /// so tables are created in a valid order.
    pub fn build(self) -> Result<StoragePlan, NamingError> {
        let mut entities: Vec<EntityPlan> = Vec::with_capacity(self.registered.len());

        for (descriptor, collection) in &self.registered {
            let mut plan = EntityPlan {
                entity: descriptor.name,
                storage: compute_storage_name(descriptor, collection),
                columns: compute_column_plan(descriptor),
                foreign_keys: Vec::new(),
            };

            for fk in descriptor.foreign_keys {
                let column = plan.column_name(fk.member)?.to_string();
                let target = if fk.target == descriptor.name {
                    &plan
                } else {
                    entities
                        .iter()
                        .find(|p| p.entity == fk.target)
                        .ok_or_else(|| NamingError::UnknownEntity(fk.target.to_string()))?
                };
                let resolved = ForeignKeyPlan {
                    column,
                    references_table: target.storage.table.clone(),
                    references_column: target.column_name(fk.target_member)?.to_string(),
                };
                plan.foreign_keys.push(resolved);
            }

            tracing::debug!(
                entity = plan.entity,
                storage = %plan.storage,
                columns = plan.columns.len(),
                "registered entity"
            );
            entities.push(plan);
        }

        Ok(StoragePlan { entities })
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
