use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;

use crate::entities::{Region, Settlement, SettlementSummary};
use crate::plan::StoragePlan;

/// Sort direction for name-ordered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Insertions staged in memory and written by a single [`Store::commit`].
#[derive(Debug, Default, Clone)]
pub struct StagedBatch {
    regions: Vec<Region>,
    settlements: Vec<Settlement>,
}

impl StagedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn add_settlement(&mut self, settlement: Settlement) {
        self.settlements.push(settlement);
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.settlements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len() + self.settlements.len()
    }
}

/// SQLite-backed persistence handle.
/// Table and column names come from the storage plan.
pub struct Store {
    conn: Connection,
    plan: Arc<StoragePlan>,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path, plan: Arc<StoragePlan>) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Self::with_connection(conn, plan)
    }

    /// Open an existing database file without creating anything on disk.
    /// Fails when the file is missing.
    pub fn open_existing(path: &Path, plan: Arc<StoragePlan>) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Self::with_connection(conn, plan)
    }

    pub fn open_in_memory(plan: Arc<StoragePlan>) -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn, plan)
    }

    fn with_connection(conn: Connection, plan: Arc<StoragePlan>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .context("Failed to enable foreign keys")?;
        Ok(Self { conn, plan })
    }

    pub fn plan(&self) -> &StoragePlan {
        &self.plan
    }

    /// Create every table in the plan. Safe to call on every startup.
    pub fn setup_database(&self) -> Result<()> {
        // Enable WAL mode for crash recovery (in-memory databases report "memory")
        let mode: String = self
            .conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .context("Failed to set journal mode")?;
        tracing::debug!(journal_mode = %mode, "journal mode set");

        for entity in self.plan.entities() {
            self.conn
                .execute(&entity.create_table_sql(), [])
                .with_context(|| format!("Failed to create table for {}", entity.storage))?;
            tracing::debug!(entity = entity.entity, storage = %entity.storage, "table ready");
        }

        Ok(())
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    /// Look up a region by its natural key.
    pub fn find_region(&self, code: &str) -> Result<Option<Region>> {
        let sql = format!(
            "{} WHERE {} = ?1",
            self.select_regions_sql()?,
            self.region_col("Code")?
        );

        self.conn
            .query_row(&sql, [code], region_from_row)
            .optional()
            .with_context(|| format!("Failed to look up region {code}"))
    }

    /// Whether any settlement carries `name`, regardless of region.
    pub fn settlement_exists(&self, name: &str) -> Result<bool> {
        let p = self.plan.entity::<Settlement>()?;
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
            p.table_ident(),
            p.col("Name")?
        );

        let exists: bool = self
            .conn
            .query_row(&sql, [name], |row| row.get(0))
            .with_context(|| format!("Failed to check settlement {name}"))?;
        Ok(exists)
    }

    /// Highest settlement key in storage, `None` when the table is empty.
    pub fn max_settlement_id(&self) -> Result<Option<i64>> {
        let p = self.plan.entity::<Settlement>()?;
        let sql = format!("SELECT MAX({}) FROM {}", p.col("Id")?, p.table_ident());

        let max: Option<i64> = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .context("Failed to read max settlement id")?;
        Ok(max)
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Write all staged rows in one transaction. Nothing is written if any
    /// insert fails.
    pub fn commit(&mut self, batch: StagedBatch) -> Result<usize> {
        let written = batch.len();
        if batch.is_empty() {
            return Ok(0);
        }

        let regions = self.plan.entity::<Region>()?;
        let insert_region = format!(
            "INSERT INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
            regions.table_ident(),
            regions.col("Code")?,
            regions.col("Name")?,
            regions.col("Balance")?,
        );

        let settlements = self.plan.entity::<Settlement>()?;
        let insert_settlement = format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
            settlements.table_ident(),
            settlements.col("Id")?,
            settlements.col("Name")?,
            settlements.col("Population")?,
            settlements.col("Balance")?,
            settlements.col("RegionCode")?,
        );

        // Dropping an uncommitted transaction rolls it back
        let tx = self.conn.transaction().context("Failed to begin batch")?;

        for region in &batch.regions {
            tx.execute(&insert_region, params![region.code, region.name, region.balance])
                .with_context(|| format!("Failed to insert region {}", region.code))?;
        }

        for s in &batch.settlements {
            tx.execute(
                &insert_settlement,
                params![s.id, s.name, s.population, s.balance, s.region_code],
            )
            .with_context(|| format!("Failed to insert settlement {}", s.name))?;
        }

        tx.commit().context("Failed to commit batch")?;
        Ok(written)
    }

    // ========================================================================
    // READ QUERIES
    // ========================================================================

    pub fn list_regions(&self, order: SortOrder) -> Result<Vec<Region>> {
        let sql = format!(
            "{} ORDER BY {} {}",
            self.select_regions_sql()?,
            self.region_col("Name")?,
            order.sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let regions = stmt
            .query_map([], region_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list regions")?;

        Ok(regions)
    }

    /// All settlements ordered by key.
    pub fn list_settlements(&self) -> Result<Vec<Settlement>> {
        let p = self.plan.entity::<Settlement>()?;
        let sql = format!(
            "SELECT {}, {}, {}, {}, {} FROM {} ORDER BY {}",
            p.col("Id")?,
            p.col("Name")?,
            p.col("Population")?,
            p.col("Balance")?,
            p.col("RegionCode")?,
            p.table_ident(),
            p.col("Id")?,
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let settlements = stmt
            .query_map([], |row| {
                Ok(Settlement {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    population: row.get(2)?,
                    balance: row.get(3)?,
                    region_code: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list settlements")?;

        Ok(settlements)
    }

    pub fn list_settlement_summaries(&self) -> Result<Vec<SettlementSummary>> {
        Ok(self
            .list_settlements()?
            .into_iter()
            .map(SettlementSummary::from)
            .collect())
    }

    pub fn count_regions(&self) -> Result<i64> {
        let table = self.plan.entity::<Region>()?.table_ident();
        self.count(&table)
    }

    pub fn count_settlements(&self) -> Result<i64> {
        let table = self.plan.entity::<Settlement>()?.table_ident();
        self.count(&table)
    }

    fn count(&self, table: &str) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .with_context(|| format!("Failed to count {table}"))?;
        Ok(count)
    }

    fn region_col(&self, member: &str) -> Result<String> {
        Ok(self.plan.entity::<Region>()?.col(member)?)
    }

    fn select_regions_sql(&self) -> Result<String> {
        let p = self.plan.entity::<Region>()?;
        Ok(format!(
            "SELECT {}, {}, {} FROM {}",
            p.col("Code")?,
            p.col("Name")?,
            p.col("Balance")?,
            p.table_ident()
        ))
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn region_from_row(row: &Row<'_>) -> rusqlite::Result<Region> {
    Ok(Region {
        code: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
    })
}
