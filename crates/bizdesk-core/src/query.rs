//! Typed query descriptors for record listings.
//!
//! A [`Query`] always names an entity kind and an owner; there is no way to
//! build an unscoped listing. Equality predicates are drawn from the fixed
//! [`QueryField`] list and combined with AND semantics.

use anyhow::{Result, bail};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::model::{EntityKind, OwnerId};
use crate::store::StoredRecord;

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Fields a listing may be filtered on by exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryField {
    /// Parent ticket of a support message.
    TicketId,
    /// Parent channel of a chat message.
    ChannelId,
    /// Parent project of a task.
    ProjectId,
    /// Employee referenced by PTO and payroll rows.
    EmployeeId,
    Email,
    Status,
}

impl QueryField {
    /// Field key inside the record's field object.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TicketId => "ticket_id",
            Self::ChannelId => "channel_id",
            Self::ProjectId => "project_id",
            Self::EmployeeId => "employee_id",
            Self::Email => "email",
            Self::Status => "status",
        }
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort order for record listings. Ties always break on record id ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    CreatedDesc,
    /// Oldest first (conversation order).
    CreatedAsc,
    /// Most recently touched first; records never updated use `created_at`.
    UpdatedDesc,
    /// Alphabetical by the `name` field.
    NameAsc,
}

impl SortOrder {
    /// SQL `ORDER BY` clause over the `records` table.
    #[must_use]
    pub const fn sql_clause(self) -> &'static str {
        match self {
            Self::CreatedDesc => "ORDER BY created_at_us DESC, record_id ASC",
            Self::CreatedAsc => "ORDER BY created_at_us ASC, record_id ASC",
            Self::UpdatedDesc => {
                "ORDER BY COALESCE(updated_at_us, created_at_us) DESC, record_id ASC"
            }
            Self::NameAsc => {
                "ORDER BY COALESCE(json_extract(fields_json, '$.name'), '') ASC, record_id ASC"
            }
        }
    }

    /// In-memory comparator equivalent to [`SortOrder::sql_clause`].
    #[must_use]
    pub fn compare(self, a: &StoredRecord, b: &StoredRecord) -> Ordering {
        let primary = match self {
            Self::CreatedDesc => b.meta.created_at.cmp(&a.meta.created_at),
            Self::CreatedAsc => a.meta.created_at.cmp(&b.meta.created_at),
            Self::UpdatedDesc => {
                let touched_a = a.meta.updated_at.unwrap_or(a.meta.created_at);
                let touched_b = b.meta.updated_at.unwrap_or(b.meta.created_at);
                touched_b.cmp(&touched_a)
            }
            Self::NameAsc => name_of(&a.fields).cmp(name_of(&b.fields)),
        };
        primary.then_with(|| a.meta.id.cmp(&b.meta.id))
    }
}

fn name_of(fields: &Map<String, Value>) -> &str {
    fields.get("name").and_then(Value::as_str).unwrap_or("")
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedDesc => f.write_str("created_desc"),
            Self::CreatedAsc => f.write_str("created_asc"),
            Self::UpdatedDesc => f.write_str("updated_desc"),
            Self::NameAsc => f.write_str("name_asc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_desc" | "created-desc" | "newest" => Ok(Self::CreatedDesc),
            "created_asc" | "created-asc" | "oldest" => Ok(Self::CreatedAsc),
            "updated_desc" | "updated-desc" | "recent" => Ok(Self::UpdatedDesc),
            "name_asc" | "name-asc" | "name" => Ok(Self::NameAsc),
            other => bail!(
                "unknown sort order '{other}': expected one of created_desc, created_asc, updated_desc, name_asc"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Owner-scoped listing request for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub kind: EntityKind,
    pub owner: OwnerId,
    pub equals: Vec<(QueryField, String)>,
    pub sort: SortOrder,
    pub limit: Option<u32>,
}

impl Query {
    /// All records of `kind` owned by `owner`, newest first.
    #[must_use]
    pub fn owned_by(kind: EntityKind, owner: OwnerId) -> Self {
        Self {
            kind,
            owner,
            equals: Vec::new(),
            sort: SortOrder::CreatedDesc,
            limit: None,
        }
    }

    /// Add an equality predicate.
    #[must_use]
    pub fn where_eq(mut self, field: QueryField, value: impl Into<String>) -> Self {
        self.equals.push((field, value.into()));
        self
    }

    #[must_use]
    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a stored record satisfies kind, owner, and every predicate.
    #[must_use]
    pub fn matches(&self, kind: EntityKind, record: &StoredRecord) -> bool {
        kind == self.kind
            && record.meta.owner == self.owner
            && self.equals.iter().all(|(field, expected)| {
                record
                    .fields
                    .get(field.key())
                    .and_then(Value::as_str)
                    .is_some_and(|actual| actual == expected)
            })
    }
}
