//! Generic list view-model over one entity kind.
//!
//! An [`EntityViewModel`] holds the current account's records of one kind as
//! of the last successful load. Mutations go to the store first; memory only
//! changes after the store confirms. Store failures are logged and
//! swallowed: operations report success as `bool` or `Option`, never as an
//! error value.

use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::codec;
use crate::model::{Entity, OwnerId, Record, RecordId, Stateful};
use crate::query::{Query, QueryField, SortOrder};
use crate::session::{Identity, SessionProvider};
use crate::store::{NewRecord, Patch, RecordStore, StoreError, StoredRecord};

/// What happens in memory after the store accepts an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Reload the whole collection.
    #[default]
    Reload,
    /// Merge the patch into the one matching record.
    Optimistic,
}

/// Status constraint for [`EntityViewModel::filtered_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter<S> {
    All,
    Only(S),
}

impl<S: PartialEq> StatusFilter<S> {
    #[must_use]
    pub fn admits(&self, status: &S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl<S: FromStr> FromStr for StatusFilter<S> {
    type Err = S::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl<S: fmt::Display> fmt::Display for StatusFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => status.fmt(f),
        }
    }
}

/// Shared handle to one kind's session-scoped collection. Clones share state.
pub struct EntityViewModel<E: Entity> {
    store: Arc<dyn RecordStore>,
    session: Arc<dyn SessionProvider>,
    sort: SortOrder,
    mode: UpdateMode,
    scope: Vec<(QueryField, String)>,
    records: Arc<Mutex<Vec<Record<E>>>>,
}

impl<E: Entity> Clone for EntityViewModel<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            session: Arc::clone(&self.session),
            sort: self.sort,
            mode: self.mode,
            scope: self.scope.clone(),
            records: Arc::clone(&self.records),
        }
    }
}

impl<E: Entity> fmt::Debug for EntityViewModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityViewModel")
            .field("kind", &E::KIND)
            .field("sort", &self.sort)
            .field("mode", &self.mode)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> EntityViewModel<E> {
    /// Empty view-model, newest-first, reloading after updates.
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            store,
            session,
            sort: SortOrder::CreatedDesc,
            mode: UpdateMode::Reload,
            scope: Vec::new(),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Restrict loads to records whose `field` equals `value`.
    #[must_use]
    pub fn scoped(mut self, field: QueryField, value: impl Into<String>) -> Self {
        self.scope.push((field, value.into()));
        self
    }

    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn session(&self) -> Arc<dyn SessionProvider> {
        Arc::clone(&self.session)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record<E>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn identity(&self, op: &'static str) -> Option<Identity> {
        let identity = self.session.current_identity();
        if identity.is_none() {
            debug!(kind = %E::KIND, op, "no signed-in identity; skipping");
        }
        identity
    }

    /// Listing query for `owner` with this view-model's scope and order.
    #[must_use]
    pub fn query_for(&self, owner: OwnerId) -> Query {
        let mut query = Query::owned_by(E::KIND, owner).sorted(self.sort);
        for (field, value) in &self.scope {
            query = query.where_eq(*field, value.clone());
        }
        query
    }

    /// Replace the collection with the current owner's records.
    ///
    /// Returns `false`, leaving the collection untouched, when nobody is
    /// signed in or the store fails.
    pub async fn load(&self) -> bool {
        let Some(identity) = self.identity("load") else {
            return false;
        };
        let query = self.query_for(identity.id);
        match fetch::<E>(self.store.as_ref(), &query).await {
            Ok(rows) => {
                debug!(kind = %E::KIND, count = rows.len(), "loaded");
                *self.lock() = rows;
                true
            }
            Err(err) => {
                warn!(kind = %E::KIND, error = %err, "load failed");
                false
            }
        }
    }

    /// Insert a new record for the current owner, then reload.
    ///
    /// Returns the record as stored, or `None` on failure.
    pub async fn create(&self, fields: E) -> Option<Record<E>> {
        let created = self.insert(None, &fields).await?;
        self.load().await;
        Some(created)
    }

    /// Like [`Self::create`] with a caller-chosen id.
    pub async fn create_with_id(&self, id: RecordId, fields: E) -> Option<Record<E>> {
        let created = self.insert(Some(id), &fields).await?;
        self.load().await;
        Some(created)
    }

    /// Insert and place the stored record first, without reloading.
    pub async fn prepend(&self, id: Option<RecordId>, fields: E) -> Option<Record<E>> {
        let created = self.insert(id, &fields).await?;
        self.lock().insert(0, created.clone());
        Some(created)
    }

    async fn insert(&self, id: Option<RecordId>, fields: &E) -> Option<Record<E>> {
        let identity = self.identity("create")?;
        let draft = match NewRecord::from_entity(identity.id, fields, Utc::now()) {
            Ok(draft) => NewRecord { id, ..draft },
            Err(err) => {
                warn!(kind = %E::KIND, error = %err, "create failed to encode fields");
                return None;
            }
        };
        let stored = match self.store.create(E::KIND, draft).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(kind = %E::KIND, error = %err, "create failed");
                return None;
            }
        };
        match stored.decode::<E>() {
            Ok(record) => {
                debug!(kind = %E::KIND, id = %record.id(), "created");
                Some(record)
            }
            Err(err) => {
                warn!(kind = %E::KIND, error = %err, "created record failed to decode");
                None
            }
        }
    }

    /// Whether `id` is in the collection and owned by the current identity.
    fn owns(&self, identity: &Identity, id: &RecordId) -> bool {
        let owned = self
            .lock()
            .iter()
            .any(|record| record.id() == id && *record.owner() == identity.id);
        if !owned {
            debug!(kind = %E::KIND, %id, "record not in the current owner's collection");
        }
        owned
    }

    /// Apply a partial update.
    ///
    /// The record must be in the collection and owned by the current
    /// identity. Memory changes only after the store accepts the patch.
    pub async fn update(&self, id: &RecordId, patch: E::Patch) -> bool {
        let Some(identity) = self.identity("update") else {
            return false;
        };
        if !self.owns(&identity, id) {
            return false;
        }
        let patch = match Patch::from_typed(&patch, Utc::now()) {
            Ok(patch) => patch,
            Err(err) => {
                warn!(kind = %E::KIND, %id, error = %err, "update rejected");
                return false;
            }
        };

        if let Err(err) = self.store.update(E::KIND, id, patch.clone()).await {
            warn!(kind = %E::KIND, %id, error = %err, "update failed");
            return false;
        }
        debug!(kind = %E::KIND, %id, mode = ?self.mode, "updated");

        match self.mode {
            UpdateMode::Reload => {
                self.load().await;
            }
            UpdateMode::Optimistic => {
                if !self.apply_local(id, &patch) {
                    self.load().await;
                }
            }
        }
        true
    }

    fn apply_local(&self, id: &RecordId, patch: &Patch) -> bool {
        let mut records = self.lock();
        let Some(record) = records.iter_mut().find(|record| record.id() == id) else {
            return false;
        };
        match merge_record(record, patch) {
            Ok(merged) => {
                *record = merged;
                true
            }
            Err(err) => {
                warn!(kind = %E::KIND, %id, error = %err, "local patch failed; reloading");
                false
            }
        }
    }

    /// Hard-delete; on success the record is dropped from memory without a
    /// reload.
    pub async fn delete(&self, id: &RecordId) -> bool {
        let Some(identity) = self.identity("delete") else {
            return false;
        };
        if !self.owns(&identity, id) {
            return false;
        }
        if let Err(err) = self.store.delete(E::KIND, id).await {
            warn!(kind = %E::KIND, %id, error = %err, "delete failed");
            return false;
        }
        self.lock().retain(|record| record.id() != id);
        debug!(kind = %E::KIND, %id, "deleted");
        true
    }

    /// Drop every record from memory, e.g. on sign-out.
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Record<E>> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<Record<E>> {
        self.lock().iter().find(|record| record.id() == id).cloned()
    }

    /// First record in collection order.
    #[must_use]
    pub fn first(&self) -> Option<Record<E>> {
        self.lock().first().cloned()
    }

    /// Records whose search fields contain `term`, ignoring case.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<Record<E>> {
        search_records(&self.lock(), term)
    }
}

impl<E: Stateful> EntityViewModel<E> {
    /// Records matching `term` and `filter`, in collection order.
    #[must_use]
    pub fn filtered_view(&self, term: &str, filter: StatusFilter<E::Status>) -> Vec<Record<E>> {
        filter_records(&self.lock(), term, filter)
    }

    /// Records grouped by status; each group keeps collection order.
    #[must_use]
    pub fn grouped_by_status(&self) -> BTreeMap<E::Status, Vec<Record<E>>> {
        group_by_status(&self.lock())
    }
}

async fn fetch<E: Entity>(store: &dyn RecordStore, query: &Query) -> Result<Vec<Record<E>>, StoreError> {
    store
        .list(query)
        .await?
        .into_iter()
        .map(StoredRecord::decode)
        .collect()
}

pub(crate) fn merge_record<E: Entity>(record: &Record<E>, patch: &Patch) -> Result<Record<E>, StoreError> {
    let mut fields = codec::to_fields(&record.fields)?;
    codec::merge_fields(&mut fields, &patch.fields);
    codec::normalize_fields(E::KIND, &mut fields);
    let merged: E = serde_json::from_value(Value::Object(fields))?;
    let mut meta = record.meta.clone();
    meta.updated_at = Some(patch.updated_at);
    Ok(Record {
        meta,
        fields: merged,
    })
}

/// Whether any search field of `fields` contains `needle`, which must
/// already be lowercase.
fn matches_term<E: Entity>(fields: &E, needle: &str) -> bool {
    needle.is_empty()
        || fields
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

/// Records whose search fields contain `term`, ignoring case. An empty term
/// matches everything.
#[must_use]
pub fn search_records<E: Entity>(records: &[Record<E>], term: &str) -> Vec<Record<E>> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| matches_term(&record.fields, &needle))
        .cloned()
        .collect()
}

/// Text and status filter over a collection, preserving order.
#[must_use]
pub fn filter_records<E: Stateful>(
    records: &[Record<E>],
    term: &str,
    filter: StatusFilter<E::Status>,
) -> Vec<Record<E>> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| {
            filter.admits(&record.fields.status()) && matches_term(&record.fields, &needle)
        })
        .cloned()
        .collect()
}

/// Group a collection by status.
#[must_use]
pub fn group_by_status<E: Stateful>(records: &[Record<E>]) -> BTreeMap<E::Status, Vec<Record<E>>> {
    let mut groups: BTreeMap<E::Status, Vec<Record<E>>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.fields.status())
            .or_default()
            .push(record.clone());
    }
    groups
}
