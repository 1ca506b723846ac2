// 🌱 Reference-Data Seeder
// Ensures the fixed catalog of regions and settlements exists exactly once.
//
// Order matters:
//   1. regions are looked up by code and staged when missing
//   2. the next settlement key is read once (max + 1, or 1)
//   3. settlements are checked by name and staged with increasing keys
//   4. everything staged is written in one batch commit

use anyhow::{Context, Result};
use serde::Serialize;

use crate::db::{StagedBatch, Store};
use crate::entities::{Region, Settlement};

/// (code, name, balance)
pub const REGION_CATALOG: &[(&str, &str, i64)] = &[
    ("CA", "California", 20_000),
    ("NY", "New York", 12_000),
    ("NE", "Nebraska", 3_000),
];

/// (name, population, owning region code)
pub const SETTLEMENT_CATALOG: &[(&str, i64, &str)] = &[
    ("Los Angeles", 3792, "CA"),
    ("San Francisco", 805, "CA"),
    ("New York", 8804, "NY"),
    ("Buffalo", 278, "NY"),
    ("Utica", 65, "NY"),
    ("Omaha", 485, "NE"),
];

/// Outcome of one seeding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub regions_added: usize,
    pub settlements_added: usize,
    /// Key the next new settlement would receive
    pub next_settlement_id: i64,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        self.regions_added == 0 && self.settlements_added == 0
    }
}

/// Seed the reference catalog. Re-running after a successful pass is a
/// no-op. A failed commit propagates and leaves prior state intact.
pub fn seed_reference_data(store: &mut Store) -> Result<SeedReport> {
    let mut batch = StagedBatch::new();
    let mut regions: Vec<Region> = Vec::with_capacity(REGION_CATALOG.len());
    let mut regions_added = 0;

    for &(code, name, balance) in REGION_CATALOG {
        let region = match store.find_region(code)? {
            Some(existing) => existing,
            None => {
                let region = Region::new(code, name, balance);
                batch.add_region(region.clone());
                regions_added += 1;
                region
            }
        };
        regions.push(region);
    }

    let mut next_id = match store.max_settlement_id()? {
        Some(max) => max.checked_add(1).context("settlement key space exhausted")?,
        None => 1,
    };
    let mut settlements_added = 0;

    for &(name, population, region_code) in SETTLEMENT_CATALOG {
        if store.settlement_exists(name)? {
            tracing::debug!(settlement = name, "settlement already present");
            continue;
        }

        let region = regions
            .iter()
            .find(|r| r.code == region_code)
            .with_context(|| format!("Settlement {name} names unknown region {region_code}"))?;

        batch.add_settlement(Settlement {
            id: next_id,
            name: name.to_string(),
            population,
            balance: 0,
            region_code: Some(region.code.clone()),
        });
        next_id = next_id.checked_add(1).context("settlement key space exhausted")?;
        settlements_added += 1;
    }

    let written = store.commit(batch).context("Seeding batch commit failed")?;

    let report = SeedReport {
        regions_added,
        settlements_added,
        next_settlement_id: next_id,
    };
    tracing::info!(
        rows = written,
        regions_added = report.regions_added,
        settlements_added = report.settlements_added,
        "reference data seeded"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SortOrder;
    use crate::plan::StoragePlan;
    use std::sync::Arc;

    fn test_store() -> Store {
        let plan = Arc::new(StoragePlan::world().unwrap());
        let store = Store::open_in_memory(plan).unwrap();
        store.setup_database().unwrap();
        store
    }

    #[test]
    fn test_seed_empty_store() {
        let mut store = test_store();

        let report = seed_reference_data(&mut store).unwrap();

        assert_eq!(report.regions_added, 3);
        assert_eq!(report.settlements_added, 6);
        assert_eq!(report.next_settlement_id, 7);
        assert_eq!(store.count_regions().unwrap(), 3);
        assert_eq!(store.count_settlements().unwrap(), 6);

        let ids: Vec<i64> = store
            .list_settlements()
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let mut store = test_store();

        seed_reference_data(&mut store).unwrap();
        let second = seed_reference_data(&mut store).unwrap();

        assert!(second.is_noop());
        assert_eq!(store.count_regions().unwrap(), 3);
        assert_eq!(store.count_settlements().unwrap(), 6);
    }

    #[test]
    fn test_seed_continues_after_existing_max_key() {
        let mut store = test_store();

        let mut batch = StagedBatch::new();
        batch.add_settlement(Settlement {
            id: 9,
            name: "Springfield".to_string(),
            population: 1,
            balance: 0,
            region_code: None,
        });
        store.commit(batch).unwrap();

        seed_reference_data(&mut store).unwrap();

        let settlements = store.list_settlements().unwrap();
        let los_angeles = settlements.iter().find(|s| s.name == "Los Angeles").unwrap();
        assert_eq!(los_angeles.id, 10);
        assert_eq!(settlements.last().unwrap().id, 15);
    }

    #[test]
    fn test_seed_fails_when_key_space_exhausted() {
        let mut store = test_store();

        let mut batch = StagedBatch::new();
        batch.add_settlement(Settlement {
            id: i64::MAX,
            name: "Springfield".to_string(),
            population: 1,
            balance: 0,
            region_code: None,
        });
        store.commit(batch).unwrap();

        let err = seed_reference_data(&mut store).unwrap_err();
        assert!(format!("{err:#}").contains("settlement key space exhausted"));

        // Nothing staged in the failed pass was written
        assert_eq!(store.count_regions().unwrap(), 0);
        assert_eq!(store.count_settlements().unwrap(), 1);
    }

    #[test]
    fn test_seed_keeps_existing_rows_untouched() {
        let mut store = test_store();

        let mut batch = StagedBatch::new();
        batch.add_region(Region::new("CA", "Golden State", 1));
        batch.add_settlement(Settlement {
            id: 1,
            name: "Omaha".to_string(),
            population: 42,
            balance: 0,
            region_code: Some("CA".to_string()),
        });
        store.commit(batch).unwrap();

        let report = seed_reference_data(&mut store).unwrap();
        assert_eq!(report.regions_added, 2);
        assert_eq!(report.settlements_added, 5);

        assert_eq!(store.find_region("CA").unwrap().unwrap().name, "Golden State");

        let omaha = store
            .list_settlements()
            .unwrap()
            .into_iter()
            .find(|s| s.name == "Omaha")
            .unwrap();
        assert_eq!(omaha.population, 42);
        assert_eq!(omaha.region_code.as_deref(), Some("CA"));

        // New settlements attach to the region found in storage
        let la = store
            .list_settlements()
            .unwrap()
            .into_iter()
            .find(|s| s.name == "Los Angeles")
            .unwrap();
        assert_eq!(la.region_code.as_deref(), Some("CA"));
    }

    #[test]
    fn test_seed_then_list_regions() {
        let mut store = test_store();
        seed_reference_data(&mut store).unwrap();

        let names: Vec<String> = store
            .list_regions(SortOrder::Ascending)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["California", "Nebraska", "New York"]);
    }
}
