//! Customer support: tickets with a per-ticket conversation.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::aggregate::{SupportSummary, support_summary};
use crate::model::{
    Record, RecordId, SenderType, SupportMessage, Ticket, TicketPatch, TicketStatus,
};
use crate::selection::SelectionController;
use crate::session::SessionProvider;
use crate::store::RecordStore;
use crate::view_model::{EntityViewModel, StatusFilter};

/// Tickets (newest first) and the selected ticket's messages (oldest first).
#[derive(Debug, Clone)]
pub struct SupportDesk {
    tickets: EntityViewModel<Ticket>,
    thread: SelectionController<Ticket, SupportMessage>,
    auto_progress_on_reply: bool,
}

impl SupportDesk {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        let tickets = EntityViewModel::new(store, session);
        Self {
            thread: SelectionController::new(tickets.clone()),
            tickets,
            auto_progress_on_reply: true,
        }
    }

    /// Whether replying to an open ticket moves it to in-progress.
    #[must_use]
    pub fn with_auto_progress(mut self, enabled: bool) -> Self {
        self.auto_progress_on_reply = enabled;
        self
    }

    #[must_use]
    pub const fn tickets(&self) -> &EntityViewModel<Ticket> {
        &self.tickets
    }

    #[must_use]
    pub const fn thread(&self) -> &SelectionController<Ticket, SupportMessage> {
        &self.thread
    }

    pub async fn load(&self) -> bool {
        self.tickets.load().await
    }

    /// File a new ticket; it always starts open.
    pub async fn open_ticket(&self, mut ticket: Ticket) -> Option<Record<Ticket>> {
        ticket.status = TicketStatus::Open;
        self.tickets.create(ticket).await
    }

    /// Select a ticket and load its conversation.
    pub async fn select(&self, id: &RecordId) -> bool {
        self.thread.select(id).await
    }

    /// Set a ticket's status, reload tickets, and mirror the change onto
    /// the selected copy when it is the same ticket.
    pub async fn update_status(&self, id: &RecordId, status: TicketStatus) -> bool {
        let patch = TicketPatch::status(status);
        if !self.tickets.update(id, patch.clone()).await {
            return false;
        }
        self.thread.patch_selected(id, &patch);
        true
    }

    /// Post an agent reply on the selected ticket.
    ///
    /// Blank text or no selection is ignored. With auto-progress enabled an
    /// open ticket moves to in-progress once the reply is stored.
    pub async fn send_reply(&self, text: &str) -> Option<Record<SupportMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let ticket = self.thread.selected()?;
        let identity = self.tickets.session().current_identity()?;

        let reply = self
            .thread
            .add_child(SupportMessage {
                ticket_id: ticket.id().clone(),
                sender: identity.email,
                sender_type: SenderType::Agent,
                message: text.to_string(),
            })
            .await?;

        if self.auto_progress_on_reply && ticket.fields.status == TicketStatus::Open {
            debug!(id = %ticket.id(), "reply moves open ticket to in-progress");
            self.update_status(ticket.id(), TicketStatus::InProgress).await;
        }
        Some(reply)
    }

    /// Delete a ticket. The conversation is left in place.
    pub async fn delete_ticket(&self, id: &RecordId) -> bool {
        if !self.tickets.delete(id).await {
            return false;
        }
        if self.thread.selected_id().as_ref() == Some(id) {
            self.thread.deselect();
        }
        true
    }

    #[must_use]
    pub fn filtered(&self, term: &str, filter: StatusFilter<TicketStatus>) -> Vec<Record<Ticket>> {
        self.tickets.filtered_view(term, filter)
    }

    #[must_use]
    pub fn summary(&self, today: NaiveDate) -> SupportSummary {
        support_summary(&self.tickets.snapshot(), today)
    }
}
