//! Marketing: campaigns, contacts, and reusable templates.

use std::sync::Arc;

use crate::aggregate::{MarketingSummary, marketing_summary};
use crate::model::{
    Campaign, CampaignPatch, CampaignStatus, Contact, ContactPatch, Record, RecordId, Template,
};
use crate::session::SessionProvider;
use crate::store::RecordStore;
use crate::view_model::{EntityViewModel, StatusFilter};

#[derive(Debug, Clone)]
pub struct MarketingHub {
    campaigns: EntityViewModel<Campaign>,
    contacts: EntityViewModel<Contact>,
    templates: EntityViewModel<Template>,
}

impl MarketingHub {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            campaigns: EntityViewModel::new(Arc::clone(&store), Arc::clone(&session)),
            contacts: EntityViewModel::new(Arc::clone(&store), Arc::clone(&session)),
            templates: EntityViewModel::new(store, session),
        }
    }

    #[must_use]
    pub const fn campaigns(&self) -> &EntityViewModel<Campaign> {
        &self.campaigns
    }

    #[must_use]
    pub const fn contacts(&self) -> &EntityViewModel<Contact> {
        &self.contacts
    }

    #[must_use]
    pub const fn templates(&self) -> &EntityViewModel<Template> {
        &self.templates
    }

    pub async fn load(&self) -> bool {
        let campaigns = self.campaigns.load().await;
        let contacts = self.contacts.load().await;
        let templates = self.templates.load().await;
        campaigns && contacts && templates
    }

    /// Draft a campaign. Delivery counters start at zero.
    pub async fn create_campaign(&self, mut campaign: Campaign) -> Option<Record<Campaign>> {
        campaign.status = CampaignStatus::Draft;
        campaign.sent_count = 0;
        campaign.open_rate = 0.0;
        campaign.click_rate = 0.0;
        self.campaigns.create(campaign).await
    }

    pub async fn update_campaign_status(&self, id: &RecordId, status: CampaignStatus) -> bool {
        self.campaigns
            .update(
                id,
                CampaignPatch {
                    status: Some(status),
                    ..CampaignPatch::default()
                },
            )
            .await
    }

    /// Record delivery results reported for a campaign.
    pub async fn record_delivery(
        &self,
        id: &RecordId,
        sent_count: u64,
        open_rate: f64,
        click_rate: f64,
    ) -> bool {
        self.campaigns
            .update(
                id,
                CampaignPatch {
                    sent_count: Some(sent_count),
                    open_rate: Some(open_rate),
                    click_rate: Some(click_rate),
                    ..CampaignPatch::default()
                },
            )
            .await
    }

    pub async fn delete_campaign(&self, id: &RecordId) -> bool {
        self.campaigns.delete(id).await
    }

    pub async fn add_contact(&self, contact: Contact) -> Option<Record<Contact>> {
        self.contacts.create(contact).await
    }

    pub async fn update_contact(&self, id: &RecordId, patch: ContactPatch) -> bool {
        self.contacts.update(id, patch).await
    }

    pub async fn add_template(&self, template: Template) -> Option<Record<Template>> {
        self.templates.create(template).await
    }

    #[must_use]
    pub fn filtered_campaigns(
        &self,
        term: &str,
        filter: StatusFilter<CampaignStatus>,
    ) -> Vec<Record<Campaign>> {
        self.campaigns.filtered_view(term, filter)
    }

    #[must_use]
    pub fn summary(&self) -> MarketingSummary {
        marketing_summary(&self.campaigns.snapshot(), &self.contacts.snapshot())
    }
}
