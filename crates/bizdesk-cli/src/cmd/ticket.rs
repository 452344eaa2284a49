//! `bz ticket`: customer support tickets and their conversations.

use bizdesk_core::model::{Record, RecordId, SupportMessage, Ticket, TicketPriority, TicketStatus};
use bizdesk_core::modules::SupportDesk;
use bizdesk_core::view_model::StatusFilter;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use tracing::info;

use super::{
    Workspace, ensure_loaded, parse_value, require_effect, require_found, require_record,
};
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render, render_mode};

#[derive(Subcommand, Debug)]
pub enum TicketCommand {
    /// Open a new ticket.
    Create(CreateArgs),
    /// List tickets, newest first.
    List(ListArgs),
    /// Show one ticket and its conversation.
    Show(IdArgs),
    /// Change a ticket's status.
    Status(StatusArgs),
    /// Post an agent reply on a ticket.
    Reply(ReplyArgs),
    /// Delete a ticket. Its messages are kept.
    Delete(IdArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Short summary of the problem.
    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long = "customer", default_value = "")]
    pub customer_name: String,

    #[arg(long = "customer-email", default_value = "")]
    pub customer_email: String,

    /// low, medium, high, or urgent.
    #[arg(long, default_value = "medium")]
    pub priority: String,

    #[arg(long, default_value = "general")]
    pub category: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// `all` or one of open, in-progress, resolved, closed.
    #[arg(long, default_value = "all")]
    pub status: String,

    /// Case-insensitive match on title, customer name, and customer email.
    #[arg(long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    pub id: String,
    /// open, in-progress, resolved, or closed.
    pub status: String,
}

#[derive(Args, Debug)]
pub struct ReplyArgs {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
struct TicketThread<'a> {
    ticket: &'a Record<Ticket>,
    messages: &'a [Record<SupportMessage>],
}

#[derive(Debug, Serialize)]
struct Deleted<'a> {
    deleted: &'a RecordId,
}

fn ticket_row(w: &mut dyn Write, t: &Record<Ticket>) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}",
        t.id(),
        t.fields.status,
        t.fields.priority,
        t.fields.title
    )
}

fn ticket_detail(w: &mut dyn Write, t: &Record<Ticket>) -> io::Result<()> {
    pretty_section(w, &format!("{} {}", t.id(), t.fields.title))?;
    pretty_kv(w, "status", t.fields.status.as_str())?;
    pretty_kv(w, "priority", t.fields.priority.as_str())?;
    pretty_kv(
        w,
        "customer",
        format!("{} <{}>", t.fields.customer_name, t.fields.customer_email),
    )?;
    pretty_kv(w, "category", &t.fields.category)?;
    pretty_kv(w, "opened", t.created_at().format("%Y-%m-%d %H:%M").to_string())?;
    if !t.fields.description.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", t.fields.description)?;
    }
    Ok(())
}

/// Dispatch a `bz ticket` subcommand.
pub async fn run_ticket(
    command: &TicketCommand,
    workspace: &Workspace,
    output: OutputMode,
) -> anyhow::Result<()> {
    let desk = SupportDesk::new(workspace.store(), workspace.session())
        .with_auto_progress(workspace.config.support.auto_progress_on_reply);
    ensure_loaded(output, desk.load().await, "tickets")?;

    match command {
        TicketCommand::Create(args) => {
            let priority: TicketPriority = parse_value(output, "priority", &args.priority)?;
            let created = desk
                .open_ticket(Ticket {
                    title: args.title.clone(),
                    description: args.description.clone(),
                    status: TicketStatus::Open,
                    priority,
                    customer_name: args.customer_name.clone(),
                    customer_email: args.customer_email.clone(),
                    assigned_to: String::new(),
                    category: args.category.clone(),
                    satisfaction_rating: None,
                })
                .await;
            let created = require_record(output, created, "ticket create")?;
            info!(id = %created.id(), "ticket opened");
            render(output, &created, |t, w| ticket_row(w, t))
        }
        TicketCommand::List(args) => {
            let filter: StatusFilter<TicketStatus> = parse_value(output, "status", &args.status)?;
            let tickets = desk.filtered(&args.search, filter);
            render_mode(
                output,
                tickets.as_slice(),
                |items, w| items.iter().try_for_each(|t| ticket_row(w, t)),
                |items, w| {
                    pretty_section(w, &format!("Tickets ({})", items.len()))?;
                    for t in items {
                        writeln!(
                            w,
                            "{:<20} {:<12} {:<8} {}",
                            t.id().as_str(),
                            t.fields.status.as_str(),
                            t.fields.priority.as_str(),
                            t.fields.title
                        )?;
                    }
                    Ok(())
                },
            )
        }
        TicketCommand::Show(args) => {
            let id = RecordId::new(args.id.as_str());
            require_found(output, desk.tickets().find(&id), "ticket", &id)?;
            ensure_loaded(output, desk.select(&id).await, "ticket conversation")?;
            let ticket = require_found(output, desk.thread().selected(), "ticket", &id)?;
            let messages = desk.thread().children();
            let thread = TicketThread {
                ticket: &ticket,
                messages: &messages,
            };
            render_mode(
                output,
                &thread,
                |t, w| {
                    ticket_row(w, t.ticket)?;
                    for m in t.messages {
                        writeln!(w, "{}\t{}\t{}", m.fields.sender_type, m.fields.sender, m.fields.message)?;
                    }
                    Ok(())
                },
                |t, w| {
                    ticket_detail(w, t.ticket)?;
                    writeln!(w)?;
                    pretty_section(w, &format!("Conversation ({})", t.messages.len()))?;
                    for m in t.messages {
                        writeln!(
                            w,
                            "[{}] {} ({}): {}",
                            m.created_at().format("%Y-%m-%d %H:%M"),
                            m.fields.sender,
                            m.fields.sender_type,
                            m.fields.message
                        )?;
                    }
                    pretty_rule(w)
                },
            )
        }
        TicketCommand::Status(args) => {
            let id = RecordId::new(args.id.as_str());
            let status: TicketStatus = parse_value(output, "status", &args.status)?;
            require_found(output, desk.tickets().find(&id), "ticket", &id)?;
            require_effect(output, desk.update_status(&id, status).await, "status change")?;
            let updated = require_found(output, desk.tickets().find(&id), "ticket", &id)?;
            info!(id = %id, status = %status, "ticket status changed");
            render(output, &updated, |t, w| ticket_row(w, t))
        }
        TicketCommand::Reply(args) => {
            let id = RecordId::new(args.id.as_str());
            require_found(output, desk.tickets().find(&id), "ticket", &id)?;
            ensure_loaded(output, desk.select(&id).await, "ticket conversation")?;
            let reply = require_record(output, desk.send_reply(&args.text).await, "reply")?;
            render(output, &reply, |m, w| {
                writeln!(w, "{}\t{}\t{}", m.id(), m.fields.sender, m.fields.message)
            })
        }
        TicketCommand::Delete(args) => {
            let id = RecordId::new(args.id.as_str());
            require_found(output, desk.tickets().find(&id), "ticket", &id)?;
            require_effect(output, desk.delete_ticket(&id).await, "ticket delete")?;
            render(output, &Deleted { deleted: &id }, |d, w| {
                writeln!(w, "deleted {}", d.deleted)
            })
        }
    }
}
