//! Record model shared by every entity kind.
//!
//! A stored record is a [`RecordMeta`] (identity, owner, timestamps) plus a
//! kind-specific field set. Field sets implement [`Entity`]; the pair is a
//! [`Record<E>`]. Both halves serialize flat into one JSON object so the
//! store sees `{"id", "user_id", "created_at", ...fields}`.

pub mod entities;
pub mod kind;
pub mod status;

pub use entities::*;
pub use kind::EntityKind;
pub use status::*;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::query::QueryField;

/// Opaque record identifier, unique within a kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Account identity that owns a record; the sole scoping key for queries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity, ownership, and timestamps common to every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: RecordId,
    #[serde(rename = "user_id")]
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Keys of [`RecordMeta`] as they appear in a flattened record object.
pub const META_KEYS: &[&str] = &["id", "user_id", "created_at", "updated_at"];

/// A stored record of one entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<E> {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(flatten)]
    pub fields: E,
}

impl<E> Record<E> {
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.meta.id
    }

    #[must_use]
    pub const fn owner(&self) -> &OwnerId {
        &self.meta.owner
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at
    }
}

/// A kind-specific field set.
pub trait Entity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Partial update; `None` fields are left untouched.
    type Patch: Serialize + Clone + fmt::Debug + Send + Sync + 'static;

    /// Text fields matched by free-text search, in display order.
    fn search_fields(&self) -> Vec<&str>;
}

/// Field sets with a single enumerated status field.
pub trait Stateful: Entity {
    type Status: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn status(&self) -> Self::Status;
}

/// Field sets that belong to a parent record of another kind.
pub trait ChildEntity: Entity {
    /// Predicate field holding the parent id.
    const PARENT: QueryField;

    fn parent_id(&self) -> &RecordId;
}
