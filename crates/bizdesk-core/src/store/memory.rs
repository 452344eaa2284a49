//! In-process [`RecordStore`] with fault injection.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{NewRecord, Patch, RecordStore, StoreError, StoredRecord};
use crate::codec;
use crate::model::{EntityKind, RecordId};
use crate::query::Query;

/// Store operations, for fault injection and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: BTreeMap<(EntityKind, RecordId), StoredRecord>,
    failing: bool,
    fail_next: Vec<StoreOp>,
    calls: HashMap<StoreOp, usize>,
}

impl MemoryState {
    fn enter(&mut self, op: StoreOp) -> Result<(), StoreError> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing {
            return Err(StoreError::Unavailable("store is offline".into()));
        }
        if let Some(pos) = self.fail_next.iter().position(|pending| *pending == op) {
            self.fail_next.remove(pos);
            return Err(StoreError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

/// Records held in a map; orderings and predicates follow [`Query`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a record as-is, bypassing id assignment and failure injection.
    pub fn seed(&self, kind: EntityKind, mut record: StoredRecord) {
        codec::normalize_fields(kind, &mut record.fields);
        self.lock()
            .records
            .insert((kind, record.meta.id.clone()), record);
    }

    /// Fail every operation until called again with `false`.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Fail the next call of `op` once.
    pub fn fail_next(&self, op: StoreOp) {
        self.lock().fail_next.push(op);
    }

    /// Number of times `op` has been invoked, including failed calls.
    #[must_use]
    pub fn calls(&self, op: StoreOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Current stored copy of a record.
    #[must_use]
    pub fn get(&self, kind: EntityKind, id: &RecordId) -> Option<StoredRecord> {
        self.lock().records.get(&(kind, id.clone())).cloned()
    }

    /// Number of records of `kind` across all owners.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.lock()
            .records
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, query: &Query) -> Result<Vec<StoredRecord>, StoreError> {
        let mut state = self.lock();
        state.enter(StoreOp::List)?;

        let mut rows: Vec<StoredRecord> = state
            .records
            .iter()
            .filter(|((kind, _), record)| query.matches(*kind, record))
            .map(|(_, record)| record.clone())
            .collect();
        rows.sort_by(|a, b| query.sort.compare(a, b));
        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(rows)
    }

    async fn create(&self, kind: EntityKind, record: NewRecord) -> Result<StoredRecord, StoreError> {
        let mut state = self.lock();
        state.enter(StoreOp::Create)?;

        let stored = record.into_stored(kind);
        let key = (kind, stored.meta.id.clone());
        if state.records.contains_key(&key) {
            return Err(StoreError::Conflict {
                kind,
                id: stored.meta.id,
            });
        }
        state.records.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, patch: Patch) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.enter(StoreOp::Update)?;

        let record = state
            .records
            .get_mut(&(kind, id.clone()))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.clone(),
            })?;
        patch.apply_to(kind, record);
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.enter(StoreOp::Delete)?;

        state
            .records
            .remove(&(kind, id.clone()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.clone(),
            })
    }
}
