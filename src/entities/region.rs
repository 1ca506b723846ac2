// 🗺️ Region Entity - natural key is the short region code ("CA", "NY")

use crate::naming::{EntityDescriptor, MemberDescriptor};
use crate::plan::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Natural key, unique and immutable once seeded
    pub code: String,
    pub name: String,
    pub balance: i64,
}

impl Region {
    pub fn new(code: impl Into<String>, name: impl Into<String>, balance: i64) -> Self {
        Region {
            code: code.into(),
            name: name.into(),
            balance,
        }
    }
}

impl Entity for Region {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Region",
        db_schema: None,
        members: &[
            MemberDescriptor::text("Code").primary_key(),
            MemberDescriptor::text("Name"),
            MemberDescriptor::integer("Balance"),
            // One-to-many navigation to the settlements of this region
            MemberDescriptor::reference("Settlements"),
        ],
        foreign_keys: &[],
    };
}
