//! Team chat: channels, the selected channel's messages, and the member
//! directory.

use std::sync::Arc;
use tracing::debug;

use crate::model::{
    Channel, ChannelType, ChatMessage, MessageType, Record, RecordId, TeamMember,
};
use crate::query::SortOrder;
use crate::selection::SelectionController;
use crate::session::SessionProvider;
use crate::store::RecordStore;
use crate::view_model::EntityViewModel;

#[derive(Debug, Clone)]
pub struct TeamChat {
    channels: EntityViewModel<Channel>,
    conversation: SelectionController<Channel, ChatMessage>,
    members: EntityViewModel<TeamMember>,
    auto_select_first: bool,
}

impl TeamChat {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        let channels = EntityViewModel::new(Arc::clone(&store), Arc::clone(&session));
        Self {
            conversation: SelectionController::new(channels.clone()),
            channels,
            members: EntityViewModel::new(store, session).sorted(SortOrder::NameAsc),
            auto_select_first: true,
        }
    }

    /// Whether [`Self::load`] selects the first channel when none is selected.
    #[must_use]
    pub fn with_auto_select(mut self, enabled: bool) -> Self {
        self.auto_select_first = enabled;
        self
    }

    #[must_use]
    pub const fn channels(&self) -> &EntityViewModel<Channel> {
        &self.channels
    }

    #[must_use]
    pub const fn conversation(&self) -> &SelectionController<Channel, ChatMessage> {
        &self.conversation
    }

    #[must_use]
    pub const fn members(&self) -> &EntityViewModel<TeamMember> {
        &self.members
    }

    /// Load channels and members. With auto-select on and nothing selected,
    /// the first channel is selected and its messages loaded.
    pub async fn load(&self) -> bool {
        let channels = self.channels.load().await;
        let members = self.members.load().await;
        self.conversation.refresh_selected();

        let first = self
            .channels
            .first()
            .filter(|_| self.auto_select_first && self.conversation.selected_id().is_none());
        if let Some(first) = first {
            debug!(id = %first.id(), "auto-selecting first channel");
            self.conversation.select(first.id()).await;
        }
        channels && members
    }

    pub async fn select(&self, id: &RecordId) -> bool {
        self.conversation.select(id).await
    }

    /// Post a text message to the selected channel as the current identity.
    /// Blank text or no selection is ignored.
    pub async fn send(&self, text: &str) -> Option<Record<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let channel = self.conversation.selected_id()?;
        let identity = self.channels.session().current_identity()?;
        self.conversation
            .add_child(ChatMessage {
                channel_id: channel,
                sender: identity.id.to_string(),
                sender_name: identity.handle().to_string(),
                message: text.to_string(),
                message_type: MessageType::Text,
                reactions: Vec::new(),
            })
            .await
    }

    /// Create a public channel with the current identity as its only member
    /// and select it. Blank names are ignored.
    pub async fn create_channel(&self, name: &str) -> Option<Record<Channel>> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let identity = self.channels.session().current_identity()?;
        let created = self
            .channels
            .create(Channel {
                name: name.to_string(),
                description: format!("Channel created by {}", identity.email),
                kind: ChannelType::Public,
                members: vec![identity.id.to_string()],
            })
            .await?;
        self.conversation.select(created.id()).await;
        Some(created)
    }

    /// Channels anyone can join.
    #[must_use]
    pub fn public_channels(&self) -> Vec<Record<Channel>> {
        self.channels
            .snapshot()
            .into_iter()
            .filter(|channel| channel.fields.kind == ChannelType::Public)
            .collect()
    }

    #[must_use]
    pub fn search_members(&self, term: &str) -> Vec<Record<TeamMember>> {
        self.members.search(term)
    }
}
