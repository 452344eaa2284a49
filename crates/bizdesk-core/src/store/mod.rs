//! Record Store contract.
//!
//! A [`RecordStore`] persists schemaless field objects keyed by
//! `(EntityKind, RecordId)`. Typed records cross the boundary through
//! [`NewRecord`], [`Patch`], and [`StoredRecord::decode`]; the store itself
//! never sees entity structs.
//!
//! Two implementations ship with the crate: [`memory::MemoryStore`] (with
//! fault injection, used by tests) and [`crate::db::SqliteStore`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec;
use crate::error::ErrorCode;
use crate::model::{Entity, EntityKind, OwnerId, Record, RecordId, RecordMeta};
use crate::query::Query;

/// Kind-specific field object, without the meta keys.
pub type Fields = Map<String, Value>;

/// Errors surfaced by a [`RecordStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} record '{id}' not found")]
    NotFound { kind: EntityKind, id: RecordId },

    #[error("{kind} record '{id}' already exists")]
    Conflict { kind: EntityKind, id: RecordId },

    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid patch: {0}")]
    InvalidPatch(String),
}

impl StoreError {
    /// Stable machine code for this failure.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::RecordNotFound,
            Self::Conflict { .. } => ErrorCode::DuplicateRecord,
            Self::Unavailable(_) => ErrorCode::StoreUnavailable,
            Self::Codec(_) => ErrorCode::CorruptRecord,
            Self::InvalidPatch(_) => ErrorCode::InvalidPatch,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                ErrorCode::LockContention
            }
            Self::Sqlite(_) => ErrorCode::StoreUnavailable,
        }
    }
}

/// A record as the store holds it: meta plus an untyped field object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub meta: RecordMeta,
    pub fields: Fields,
}

impl StoredRecord {
    /// Decode into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Codec`] if the field object does not match `E`.
    pub fn decode<E: Entity>(self) -> Result<Record<E>, StoreError> {
        let fields: E = serde_json::from_value(Value::Object(self.fields))?;
        Ok(Record {
            meta: self.meta,
            fields,
        })
    }

    /// Flat JSON object with meta keys and fields side by side.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = self.fields.clone();
        if let Ok(Value::Object(meta)) = serde_json::to_value(&self.meta) {
            object.extend(meta);
        }
        Value::Object(object)
    }
}

/// Insert request. `id` is optional; the store assigns one when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub id: Option<RecordId>,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
    pub fields: Fields,
}

impl NewRecord {
    /// Build an insert request from a typed field set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Codec`] if `fields` does not serialize to an
    /// object.
    pub fn from_entity<E: Entity>(
        owner: OwnerId,
        fields: &E,
        created_at: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            id: None,
            owner,
            created_at,
            fields: codec::to_fields(fields)?,
        })
    }

    #[must_use]
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Resolve into the stored form, assigning an id if none was given.
    #[must_use]
    pub fn into_stored(self, kind: EntityKind) -> StoredRecord {
        let id = self.id.unwrap_or_else(|| generate_id(kind));
        let mut fields = self.fields;
        codec::normalize_fields(kind, &mut fields);
        StoredRecord {
            meta: RecordMeta {
                id,
                owner: self.owner,
                created_at: self.created_at,
                updated_at: None,
            },
            fields,
        }
    }
}

/// Partial update: changed fields plus the `updated_at` stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub fields: Fields,
    pub updated_at: DateTime<Utc>,
}

impl Patch {
    /// Build a patch from a typed partial; absent fields are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPatch`] if the value is not an object or
    /// tries to overwrite a meta key.
    pub fn from_typed<P: Serialize>(patch: &P, updated_at: DateTime<Utc>) -> Result<Self, StoreError> {
        let value = serde_json::to_value(patch)?;
        let Value::Object(fields) = value else {
            return Err(StoreError::InvalidPatch(format!(
                "expected an object, got {value}"
            )));
        };
        Self::from_fields(fields, updated_at)
    }

    /// Build a patch from a raw field object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPatch`] if a meta key is present.
    pub fn from_fields(fields: Fields, updated_at: DateTime<Utc>) -> Result<Self, StoreError> {
        if let Some(key) = crate::model::META_KEYS
            .iter()
            .find(|key| fields.contains_key(**key))
        {
            return Err(StoreError::InvalidPatch(format!(
                "field '{key}' cannot be patched"
            )));
        }
        Ok(Self { fields, updated_at })
    }

    /// Apply to a stored record in place.
    pub fn apply_to(&self, kind: EntityKind, record: &mut StoredRecord) {
        codec::merge_fields(&mut record.fields, &self.fields);
        codec::normalize_fields(kind, &mut record.fields);
        record.meta.updated_at = Some(self.updated_at);
    }
}

/// Persistence backend for owner-scoped records.
///
/// Implementations must honor every predicate of a [`Query`], including the
/// owner, and order results by [`Query::sort`] with ties broken by id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records matching `query`, ordered and limited.
    async fn list(&self, query: &Query) -> Result<Vec<StoredRecord>, StoreError>;

    /// Insert a record and return it as stored.
    async fn create(&self, kind: EntityKind, record: NewRecord) -> Result<StoredRecord, StoreError>;

    /// Merge `patch` into the record's fields and stamp `updated_at`.
    async fn update(&self, kind: EntityKind, id: &RecordId, patch: Patch) -> Result<(), StoreError>;

    /// Hard-delete a record.
    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError>;
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 8;

/// Fresh store-assigned id: `<kind prefix>-<8 base36 chars>`.
#[must_use]
pub fn generate_id(kind: EntityKind) -> RecordId {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    RecordId::new(format!("{}-{suffix}", kind.id_prefix()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SenderType, SupportMessage, TicketPatch, TicketStatus};
    use serde_json::json;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid ts")
    }

    #[test]
    fn generated_ids_carry_kind_prefix() {
        let id = generate_id(EntityKind::Ticket);
        let (prefix, suffix) = id.as_str().split_once('-').expect("dash");
        assert_eq!(prefix, "tkt");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.bytes().all(|b| ID_ALPHABET.contains(&b)));
        assert_ne!(generate_id(EntityKind::Ticket), id);
    }

    #[test]
    fn patch_rejects_meta_keys() {
        let mut fields = Fields::new();
        fields.insert("user_id".into(), json!("someone-else"));
        let err = Patch::from_fields(fields, epoch()).expect_err("meta key");
        assert!(matches!(err, StoreError::InvalidPatch(_)));
        assert_eq!(err.code(), ErrorCode::InvalidPatch);
    }

    #[test]
    fn patch_apply_merges_and_stamps() {
        let mut record = NewRecord::from_entity(
            OwnerId::new("u1"),
            &SupportMessage {
                ticket_id: RecordId::new("t1"),
                sender: "a@b.c".into(),
                sender_type: SenderType::Customer,
                message: "hi".into(),
            },
            epoch(),
        )
        .expect("new record")
        .into_stored(EntityKind::Message);

        let mut fields = Fields::new();
        fields.insert("message".into(), json!("edited"));
        let stamp = epoch() + chrono::Duration::seconds(5);
        Patch::from_fields(fields, stamp)
            .expect("patch")
            .apply_to(EntityKind::Message, &mut record);

        assert_eq!(record.fields["message"], "edited");
        assert_eq!(record.fields["ticket_id"], "t1");
        assert_eq!(record.meta.updated_at, Some(stamp));
    }

    #[test]
    fn typed_patch_skips_absent_fields() {
        let patch = Patch::from_typed(&TicketPatch::status(TicketStatus::Closed), epoch())
            .expect("patch");
        assert_eq!(patch.fields.len(), 1);
        assert_eq!(patch.fields["status"], "closed");
    }

    #[test]
    fn decode_round_trips_through_flat_json() {
        let stored = NewRecord::from_entity(
            OwnerId::new("u1"),
            &SupportMessage {
                ticket_id: RecordId::new("t1"),
                sender: "a@b.c".into(),
                sender_type: SenderType::Agent,
                message: "hello".into(),
            },
            epoch(),
        )
        .expect("new record")
        .with_id(RecordId::new("msg-1"))
        .into_stored(EntityKind::Message);

        let flat = stored.to_json();
        assert_eq!(flat["id"], "msg-1");
        assert_eq!(flat["user_id"], "u1");

        let record: Record<SupportMessage> = stored.decode().expect("decode");
        assert_eq!(record.fields.message, "hello");
        assert_eq!(record.id().as_str(), "msg-1");
    }
}
