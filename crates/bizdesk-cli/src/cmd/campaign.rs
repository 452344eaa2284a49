//! `bz campaign`: marketing campaigns.

use bizdesk_core::model::{Campaign, CampaignStatus, CampaignType, Record, RecordId};
use bizdesk_core::modules::MarketingHub;
use bizdesk_core::view_model::StatusFilter;
use clap::{Args, Subcommand};
use std::io::{self, Write};
use tracing::info;

use super::{Workspace, ensure_loaded, parse_value, require_effect, require_found, require_record};
use crate::output::{OutputMode, pretty_section, render, render_mode};

#[derive(Subcommand, Debug)]
pub enum CampaignCommand {
    /// Draft a new campaign.
    Create(CreateArgs),
    /// List campaigns, newest first.
    List(ListArgs),
    /// Move a campaign to another status.
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    /// email, social, ads, or content.
    #[arg(long = "type", default_value = "email")]
    pub kind: String,

    #[arg(long, default_value = "")]
    pub audience: String,

    #[arg(long, default_value = "")]
    pub content: String,

    /// Subject line for email campaigns.
    #[arg(long)]
    pub subject: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// `all` or one of draft, scheduled, active, completed, paused.
    #[arg(long, default_value = "all")]
    pub status: String,

    /// Case-insensitive match on name and audience.
    #[arg(long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    pub id: String,
    pub status: String,
}

fn campaign_row(w: &mut dyn Write, c: &Record<Campaign>) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}",
        c.id(),
        c.fields.kind,
        c.fields.status,
        c.fields.sent_count,
        c.fields.name
    )
}

/// Dispatch a `bz campaign` subcommand.
pub async fn run_campaign(
    command: &CampaignCommand,
    workspace: &Workspace,
    output: OutputMode,
) -> anyhow::Result<()> {
    let hub = MarketingHub::new(workspace.store(), workspace.session());
    ensure_loaded(output, hub.load().await, "marketing records")?;

    match command {
        CampaignCommand::Create(args) => {
            let kind: CampaignType = parse_value(output, "type", &args.kind)?;
            let campaign = Campaign {
                name: args.name.clone(),
                kind,
                status: CampaignStatus::Draft,
                subject: args.subject.clone(),
                content: args.content.clone(),
                audience: args.audience.clone(),
                scheduled_date: None,
                sent_count: 0,
                open_rate: 0.0,
                click_rate: 0.0,
            };
            let created = require_record(output, hub.create_campaign(campaign).await, "campaign create")?;
            info!(id = %created.id(), "campaign drafted");
            render(output, &created, |c, w| campaign_row(w, c))
        }
        CampaignCommand::List(args) => {
            let filter: StatusFilter<CampaignStatus> = parse_value(output, "status", &args.status)?;
            let campaigns = hub.filtered_campaigns(&args.search, filter);
            render_mode(
                output,
                campaigns.as_slice(),
                |items, w| items.iter().try_for_each(|c| campaign_row(w, c)),
                |items, w| {
                    pretty_section(w, &format!("Campaigns ({})", items.len()))?;
                    for c in items {
                        writeln!(
                            w,
                            "{:<20} {:<8} {:<10} open {:>5.1}%  click {:>5.1}%  {}",
                            c.id().as_str(),
                            c.fields.kind.as_str(),
                            c.fields.status.as_str(),
                            c.fields.open_rate,
                            c.fields.click_rate,
                            c.fields.name
                        )?;
                    }
                    Ok(())
                },
            )
        }
        CampaignCommand::Status(args) => {
            let id = RecordId::new(args.id.as_str());
            let status: CampaignStatus = parse_value(output, "status", &args.status)?;
            require_found(output, hub.campaigns().find(&id), "campaign", &id)?;
            require_effect(output, hub.update_campaign_status(&id, status).await, "status change")?;
            let updated = require_found(output, hub.campaigns().find(&id), "campaign", &id)?;
            render(output, &updated, |c, w| campaign_row(w, c))
        }
    }
}
