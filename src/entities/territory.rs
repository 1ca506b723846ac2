// Territory Entity - declared and given a table, never seeded or queried.

use crate::naming::{EntityDescriptor, MemberDescriptor};
use crate::plan::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub code: String,
    pub name: String,
    pub balance: i64,
    pub leader_name: Option<String>,
}

impl Entity for Territory {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        name: "Territory",
        db_schema: None,
        members: &[
            MemberDescriptor::text("Code").primary_key(),
            MemberDescriptor::text("Name"),
            MemberDescriptor::integer("Balance"),
            MemberDescriptor::text("LeaderName").nullable(),
        ],
        foreign_keys: &[],
    };
}
