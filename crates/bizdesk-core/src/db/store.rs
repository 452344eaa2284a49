//! [`RecordStore`] over the `records` table.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codec;
use crate::model::{EntityKind, OwnerId, RecordId, RecordMeta};
use crate::query::Query;
use crate::store::{Fields, NewRecord, Patch, RecordStore, StoreError, StoredRecord};

/// SQLite record store. Calls run inline on the caller's task; each is a
/// single short statement or transaction.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-migrated connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open the database at `path`, creating and migrating it as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(super::open_store(path)?))
    }

    /// Fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if migration fails.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(super::open_in_memory()?))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn list_rows(&self, query: &Query) -> Result<Vec<StoredRecord>, StoreError> {
        let mut sql = String::from(
            "SELECT record_id, owner_id, created_at_us, updated_at_us, fields_json
             FROM records
             WHERE kind = ?1 AND owner_id = ?2",
        );
        let mut values: Vec<String> = vec![
            query.kind.as_str().to_string(),
            query.owner.as_str().to_string(),
        ];
        for (field, value) in &query.equals {
            values.push(value.clone());
            sql.push_str(&format!(
                " AND json_extract(fields_json, '$.{}') = ?{}",
                field.key(),
                values.len()
            ));
        }
        sql.push(' ');
        sql.push_str(query.sort.sql_clause());
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(RawRow {
                id: row.get(0)?,
                owner: row.get(1)?,
                created_at_us: row.get(2)?,
                updated_at_us: row.get(3)?,
                fields_json: row.get(4)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_stored(query.kind)?);
        }
        Ok(records)
    }

    fn insert_row(&self, kind: EntityKind, record: NewRecord) -> Result<StoredRecord, StoreError> {
        let mut stored = record.into_stored(kind);
        stored.meta.created_at = truncate_to_micros(stored.meta.created_at)?;
        let fields_json = serde_json::to_string(&stored.fields)?;

        let result = self.lock().execute(
            "INSERT INTO records (kind, record_id, owner_id, created_at_us, updated_at_us, fields_json)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            params![
                kind.as_str(),
                stored.meta.id.as_str(),
                stored.meta.owner.as_str(),
                stored.meta.created_at.timestamp_micros(),
                fields_json,
            ],
        );
        match result {
            Ok(_) => Ok(stored),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict {
                    kind,
                    id: stored.meta.id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update_row(&self, kind: EntityKind, id: &RecordId, patch: &Patch) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT fields_json FROM records WHERE kind = ?1 AND record_id = ?2",
                params![kind.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(StoreError::NotFound {
                kind,
                id: id.clone(),
            });
        };

        let mut fields = parse_fields(&current)?;
        codec::merge_fields(&mut fields, &patch.fields);
        codec::normalize_fields(kind, &mut fields);

        tx.execute(
            "UPDATE records SET fields_json = ?1, updated_at_us = ?2
             WHERE kind = ?3 AND record_id = ?4",
            params![
                serde_json::to_string(&fields)?,
                patch.updated_at.timestamp_micros(),
                kind.as_str(),
                id.as_str(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_row(&self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError> {
        let changed = self.lock().execute(
            "DELETE FROM records WHERE kind = ?1 AND record_id = ?2",
            params![kind.as_str(), id.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind,
                id: id.clone(),
            });
        }
        Ok(())
    }
}

struct RawRow {
    id: String,
    owner: String,
    created_at_us: i64,
    updated_at_us: Option<i64>,
    fields_json: String,
}

impl RawRow {
    fn into_stored(self, kind: EntityKind) -> Result<StoredRecord, StoreError> {
        let mut fields = parse_fields(&self.fields_json)?;
        codec::normalize_fields(kind, &mut fields);
        Ok(StoredRecord {
            meta: RecordMeta {
                id: RecordId::new(self.id),
                owner: OwnerId::new(self.owner),
                created_at: from_micros(self.created_at_us)?,
                updated_at: self.updated_at_us.map(from_micros).transpose()?,
            },
            fields,
        })
    }
}

fn parse_fields(json: &str) -> Result<Fields, StoreError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(fields) => Ok(fields),
        _ => Ok(Fields::new()),
    }
}

fn from_micros(us: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp_micros(us)
        .ok_or_else(|| StoreError::Sqlite(rusqlite::Error::IntegralValueOutOfRange(2, us)))
}

fn truncate_to_micros(ts: DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
    from_micros(ts.timestamp_micros())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn list(&self, query: &Query) -> Result<Vec<StoredRecord>, StoreError> {
        self.list_rows(query)
    }

    async fn create(&self, kind: EntityKind, record: NewRecord) -> Result<StoredRecord, StoreError> {
        self.insert_row(kind, record)
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, patch: Patch) -> Result<(), StoreError> {
        self.update_row(kind, id, &patch)
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError> {
        self.delete_row(kind, id)
    }
}
