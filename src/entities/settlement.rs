// 🏙️ Settlement Entity - surrogate integer key assigned by the seeder

use crate::naming::{EntityDescriptor, ForeignKeyDescriptor, MemberDescriptor};
use crate::plan::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: i64,
    pub name: String,
    pub population: i64,
    pub balance: i64,
    /// Owning region. `None` means unassigned.
    pub region_code: Option<String>,
}

impl Entity for Settlement {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Settlement",
        db_schema: Some("World"),
        members: &[
            MemberDescriptor::integer("Id").primary_key(),
            MemberDescriptor::text("Name"),
            MemberDescriptor::integer("Population"),
            MemberDescriptor::integer("Balance"),
            MemberDescriptor::text("RegionCode").nullable(),
            MemberDescriptor::reference("Region"),
        ],
        foreign_keys: &[ForeignKeyDescriptor {
            member: "RegionCode",
            target: "Region",
            target_member: "Code",
        }],
    };
}

/// Read-side projection returned by the settlements listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub name: String,
    pub population: i64,
    pub region_code: Option<String>,
}

impl From<Settlement> for SettlementSummary {
    fn from(settlement: Settlement) -> Self {
        Self {
            name: settlement.name,
            population: settlement.population,
            region_code: settlement.region_code,
        }
    }
}
