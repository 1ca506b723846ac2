// 🏷️ Naming Convention Mapper
// Maps structural names (PascalCase members, collection names) onto the
// storage convention: lower-case, words separated by underscores.
//
// Types declare themselves through a static EntityDescriptor, there is no
// runtime introspection. The descriptor is the single place a member's
// storage shape is stated; everything downstream derives from it.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Schema used when an entity does not carry a `db_schema` marker.
pub const DEFAULT_SCHEMA: &str = "public";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("malformed identifier '{0}': expected 'schema.table'")]
    MalformedIdentifier(String),

    #[error("entity '{entity}' has no column for member '{member}'")]
    UnknownMember { entity: String, member: String },

    #[error("entity '{0}' is not registered in the storage plan")]
    UnknownEntity(String),
}

// ============================================================================
// IDENTIFIER NORMALIZATION
// ============================================================================

/// Converts an identifier to lower-case snake case.
///
/// A separator is inserted before every character (except the first) whose
/// lower-case form differs from itself. This is a per-character heuristic,
/// so runs of capitals split on every letter: `ABCName` → `a_b_c_name`.
///
/// ```
/// use world_catalog::naming::normalize_identifier;
/// assert_eq!(normalize_identifier("FirstName"), "first_name");
/// ```
pub fn normalize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);

    for (i, c) in raw.chars().enumerate() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        if c != lower && i > 0 {
            out.push('_');
        }
        out.push(c);
    }

    out.to_lowercase().trim().to_string()
}

// ============================================================================
// STORAGE NAME (schema.table)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageName {
    pub schema: String,
    pub table: String,
}

impl StorageName {
    /// Parse a `schema.table` composite. The split happens at the first `.`,
    /// and both halves must be non-empty.
    pub fn parse(composite: &str) -> Result<Self, NamingError> {
        match composite.split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => Ok(StorageName {
                schema: schema.to_string(),
                table: table.to_string(),
            }),
            _ => Err(NamingError::MalformedIdentifier(composite.to_string())),
        }
    }
}

impl fmt::Display for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

// ============================================================================
// ENTITY DESCRIPTORS
// ============================================================================

/// How a member is stored. `Reference` members are navigation links to
/// other entities; they become relationships, never columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberKind {
    Integer,
    Real,
    Text,
    Reference,
}

impl MemberKind {
    /// Value types and text map to columns.
    pub fn is_column(&self) -> bool {
        !matches!(self, MemberKind::Reference)
    }

    pub fn sql_type(&self) -> Option<&'static str> {
        match self {
            MemberKind::Integer => Some("INTEGER"),
            MemberKind::Real => Some("REAL"),
            MemberKind::Text => Some("TEXT"),
            MemberKind::Reference => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: &'static str,
    pub kind: MemberKind,
    pub nullable: bool,
    pub primary_key: bool,
}

impl MemberDescriptor {
    pub const fn new(name: &'static str, kind: MemberKind) -> Self {
        MemberDescriptor {
            name,
            kind,
            nullable: false,
            primary_key: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, MemberKind::Integer)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, MemberKind::Text)
    }

    pub const fn reference(name: &'static str) -> Self {
        Self::new(name, MemberKind::Reference)
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// `member` on the declaring entity references `target_member` on `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDescriptor {
    pub member: &'static str,
    pub target: &'static str,
    pub target_member: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    pub name: &'static str,
    /// Schema marker. Blank or absent means [`DEFAULT_SCHEMA`].
    pub db_schema: Option<&'static str>,
    pub members: &'static [MemberDescriptor],
    pub foreign_keys: &'static [ForeignKeyDescriptor],
}

// ============================================================================
// COLUMN PLAN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub member: &'static str,
    pub column: String,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Full storage name for an entity exposed through `collection` on the
/// aggregate root.
pub fn compute_storage_name(descriptor: &EntityDescriptor, collection: &str) -> StorageName {
    let schema = match descriptor.db_schema {
        Some(marker) if !marker.trim().is_empty() => normalize_identifier(marker),
        _ => DEFAULT_SCHEMA.to_string(),
    };

    StorageName {
        schema,
        table: normalize_identifier(collection),
    }
}

/// Column mappings for every value/text member, in declaration order.
pub fn compute_column_plan(descriptor: &EntityDescriptor) -> Vec<ColumnMapping> {
    descriptor
        .members
        .iter()
        .filter(|member| member.kind.is_column())
        .filter_map(|member| {
            let sql_type = member.kind.sql_type()?;
            let column = normalize_identifier(member.name);
            if column.is_empty() {
                return None;
            }
            Some(ColumnMapping {
                member: member.name,
                column,
                sql_type,
                nullable: member.nullable,
                primary_key: member.primary_key,
            })
        })
        .collect()
}
