//! Selection of one parent record and its dependent child collection.
//!
//! Changing the selection empties the child collection immediately, then
//! issues the child load. Loads are never cancelled: if an earlier load
//! resolves after a later one, its rows replace whatever is displayed.

use chrono::Utc;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::model::{ChildEntity, Entity, Record, RecordId};
use crate::query::{Query, SortOrder};
use crate::store::{NewRecord, Patch, StoredRecord};
use crate::view_model::{EntityViewModel, merge_record};

struct SelectionState<P, C> {
    selected: Option<Record<P>>,
    children: Vec<Record<C>>,
}

/// At most one selected `P`, with its `C` children ordered oldest first.
pub struct SelectionController<P: Entity, C: ChildEntity> {
    parents: EntityViewModel<P>,
    state: Arc<Mutex<SelectionState<P, C>>>,
}

impl<P: Entity, C: ChildEntity> Clone for SelectionController<P, C> {
    fn clone(&self) -> Self {
        Self {
            parents: self.parents.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<P: Entity, C: ChildEntity> fmt::Debug for SelectionController<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SelectionController")
            .field("parent", &P::KIND)
            .field("child", &C::KIND)
            .field("selected", &state.selected.as_ref().map(Record::id))
            .field("children", &state.children.len())
            .finish()
    }
}

impl<P: Entity, C: ChildEntity> SelectionController<P, C> {
    /// Selection over the records of `parents`.
    pub fn new(parents: EntityViewModel<P>) -> Self {
        Self {
            parents,
            state: Arc::new(Mutex::new(SelectionState {
                selected: None,
                children: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState<P, C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn parents(&self) -> &EntityViewModel<P> {
        &self.parents
    }

    /// Select the parent `id` from the parent collection and load its
    /// children. Returns `false` if `id` is not in the collection.
    pub async fn select(&self, id: &RecordId) -> bool {
        let Some(record) = self.parents.find(id) else {
            debug!(kind = %P::KIND, %id, "cannot select record outside the collection");
            return false;
        };
        {
            let mut state = self.lock();
            state.selected = Some(record);
            state.children.clear();
        }
        self.load_children(id).await;
        true
    }

    /// Clear the selection and its children.
    pub fn deselect(&self) {
        let mut state = self.lock();
        state.selected = None;
        state.children.clear();
    }

    #[must_use]
    pub fn selected(&self) -> Option<Record<P>> {
        self.lock().selected.clone()
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<RecordId> {
        self.lock().selected.as_ref().map(|record| record.id().clone())
    }

    #[must_use]
    pub fn children(&self) -> Vec<Record<C>> {
        self.lock().children.clone()
    }

    /// Reload the children of the current selection.
    pub async fn reload_children(&self) -> bool {
        match self.selected_id() {
            Some(id) => self.load_children(&id).await,
            None => false,
        }
    }

    async fn load_children(&self, parent: &RecordId) -> bool {
        let Some(identity) = self.parents.session().current_identity() else {
            debug!(kind = %C::KIND, "no signed-in identity; skipping child load");
            return false;
        };
        let query = Query::owned_by(C::KIND, identity.id)
            .where_eq(C::PARENT, parent.as_str())
            .sorted(SortOrder::CreatedAsc);

        let store = self.parents.store();
        let rows = match store.list(&query).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(kind = %C::KIND, %parent, error = %err, "child load failed");
                return false;
            }
        };
        let children: Result<Vec<Record<C>>, _> =
            rows.into_iter().map(StoredRecord::decode).collect();
        match children {
            Ok(children) => {
                debug!(kind = %C::KIND, %parent, count = children.len(), "children loaded");
                self.lock().children = children;
                true
            }
            Err(err) => {
                warn!(kind = %C::KIND, %parent, error = %err, "child rows failed to decode");
                false
            }
        }
    }

    /// Create a child of the current selection, then reload the children.
    ///
    /// `fields` must reference the selected parent.
    pub async fn add_child(&self, fields: C) -> Option<Record<C>> {
        let parent = self.selected_id()?;
        if *fields.parent_id() != parent {
            warn!(kind = %C::KIND, %parent, "child references a different parent");
            return None;
        }
        let identity = self.parents.session().current_identity()?;
        let draft = match NewRecord::from_entity(identity.id, &fields, Utc::now()) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(kind = %C::KIND, error = %err, "child failed to encode");
                return None;
            }
        };
        let created = match self.parents.store().create(C::KIND, draft).await {
            Ok(stored) => stored.decode::<C>(),
            Err(err) => {
                warn!(kind = %C::KIND, %parent, error = %err, "child create failed");
                return None;
            }
        };
        self.reload_children().await;
        match created {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(kind = %C::KIND, error = %err, "created child failed to decode");
                None
            }
        }
    }

    /// Apply `patch` to the selected copy only. Used after the store has
    /// already accepted the same patch through the parent view-model.
    pub fn patch_selected(&self, id: &RecordId, patch: &P::Patch) -> bool {
        let patch = match Patch::from_typed(patch, Utc::now()) {
            Ok(patch) => patch,
            Err(err) => {
                warn!(kind = %P::KIND, %id, error = %err, "selected patch rejected");
                return false;
            }
        };
        let mut state = self.lock();
        let Some(selected) = state.selected.as_mut().filter(|record| record.id() == id) else {
            return false;
        };
        match merge_record(selected, &patch) {
            Ok(merged) => {
                *selected = merged;
                true
            }
            Err(err) => {
                warn!(kind = %P::KIND, %id, error = %err, "selected patch failed");
                false
            }
        }
    }

    /// Re-read the selected record from the parent collection. A selection
    /// that is no longer present is cleared.
    pub fn refresh_selected(&self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.parents.find(&id) {
            Some(fresh) => self.lock().selected = Some(fresh),
            None => self.deselect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        OwnerId, RecordMeta, SenderType, SupportMessage, Ticket, TicketPatch, TicketPriority,
        TicketStatus,
    };
    use crate::session::{Identity, LocalSession};
    use crate::store::memory::{MemoryStore, StoreOp};
    use crate::store::RecordStore;
    use chrono::DateTime;
    use serde_json::Value;

    fn ticket_fields(title: &str) -> Ticket {
        Ticket {
            title: title.into(),
            description: String::new(),
            status: TicketStatus::Open,
            priority: TicketPriority::Low,
            customer_name: "Sam".into(),
            customer_email: "sam@example.com".into(),
            assigned_to: String::new(),
            category: "billing".into(),
            satisfaction_rating: None,
        }
    }

    fn seed_message(store: &MemoryStore, id: &str, ticket: &str, secs: i64) {
        let message = SupportMessage {
            ticket_id: RecordId::new(ticket),
            sender: "sam@example.com".into(),
            sender_type: SenderType::Customer,
            message: format!("message {id}"),
        };
        let Ok(Value::Object(fields)) = serde_json::to_value(&message) else {
            panic!("message serializes to an object");
        };
        store.seed(
            crate::model::EntityKind::Message,
            StoredRecord {
                meta: RecordMeta {
                    id: RecordId::new(id),
                    owner: OwnerId::new("u1"),
                    created_at: DateTime::from_timestamp(secs, 0).expect("ts"),
                    updated_at: None,
                },
                fields,
            },
        );
    }

    async fn setup() -> (
        Arc<MemoryStore>,
        SelectionController<Ticket, SupportMessage>,
        Record<Ticket>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(LocalSession::signed_in(Identity::new("u1", "agent@example.com")));
        let tickets = EntityViewModel::<Ticket>::new(store.clone(), session);
        let ticket = tickets.create(ticket_fields("T1")).await.expect("ticket");
        (store, SelectionController::new(tickets), ticket)
    }

    #[tokio::test]
    async fn select_loads_children_oldest_first() {
        let (store, selection, ticket) = setup().await;
        seed_message(&store, "m2", ticket.id().as_str(), 20);
        seed_message(&store, "m1", ticket.id().as_str(), 10);
        seed_message(&store, "other", "tkt-other", 5);

        assert!(selection.select(ticket.id()).await);
        let ids: Vec<_> = selection
            .children()
            .iter()
            .map(|m| m.id().to_string())
            .collect();
        assert_eq!(ids, ["m1", "m2"]);
    }

    #[tokio::test]
    async fn selecting_unknown_id_is_rejected() {
        let (store, selection, _ticket) = setup().await;
        let lists = store.calls(StoreOp::List);
        assert!(!selection.select(&RecordId::new("missing")).await);
        assert!(selection.selected().is_none());
        assert_eq!(store.calls(StoreOp::List), lists);
    }

    #[tokio::test]
    async fn failed_child_load_leaves_children_empty() {
        let (store, selection, ticket) = setup().await;
        seed_message(&store, "m1", ticket.id().as_str(), 10);
        store.fail_next(StoreOp::List);
        assert!(selection.select(ticket.id()).await);
        assert!(selection.children().is_empty());
        assert!(selection.selected().is_some());
    }

    #[tokio::test]
    async fn add_child_requires_matching_parent() {
        let (store, selection, ticket) = setup().await;
        assert!(selection.select(ticket.id()).await);

        let stray = SupportMessage {
            ticket_id: RecordId::new("tkt-other"),
            sender: "agent@example.com".into(),
            sender_type: SenderType::Agent,
            message: "wrong thread".into(),
        };
        assert!(selection.add_child(stray).await.is_none());
        assert_eq!(store.calls(StoreOp::Create), 1);

        let reply = SupportMessage {
            ticket_id: ticket.id().clone(),
            sender: "agent@example.com".into(),
            sender_type: SenderType::Agent,
            message: "on it".into(),
        };
        assert!(selection.add_child(reply).await.is_some());
        assert_eq!(selection.children().len(), 1);
    }

    #[tokio::test]
    async fn patch_selected_touches_only_the_matching_copy() {
        let (store, selection, ticket) = setup().await;
        assert!(selection.select(ticket.id()).await);
        let patch = TicketPatch::status(TicketStatus::InProgress);

        assert!(!selection.patch_selected(&RecordId::new("nope"), &patch));
        assert!(selection.patch_selected(ticket.id(), &patch));
        assert_eq!(
            selection.selected().map(|t| t.fields.status),
            Some(TicketStatus::InProgress)
        );
        // store untouched
        let stored = store
            .list(&selection.parents().query_for(OwnerId::new("u1")))
            .await
            .expect("list");
        assert_eq!(stored[0].fields["status"], "open");
    }

    #[tokio::test]
    async fn refresh_clears_vanished_selection() {
        let (_store, selection, ticket) = setup().await;
        assert!(selection.select(ticket.id()).await);
        assert!(selection.parents().delete(ticket.id()).await);
        selection.refresh_selected();
        assert!(selection.selected().is_none());
    }
}
