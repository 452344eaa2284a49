//! `bz channel`: team chat channels and messages.

use bizdesk_core::model::{Channel, ChatMessage, Record, RecordId};
use bizdesk_core::modules::TeamChat;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};

use super::{Workspace, ensure_loaded, require_found, require_record};
use crate::output::{OutputMode, pretty_section, render, render_mode};

#[derive(Subcommand, Debug)]
pub enum ChannelCommand {
    /// Create a public channel.
    Create(CreateArgs),
    /// List channels, newest first.
    List,
    /// Post a message to a channel.
    Post(PostArgs),
    /// Show a channel and its messages, oldest first.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub name: String,
}

#[derive(Args, Debug)]
pub struct PostArgs {
    pub channel: String,
    pub text: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub channel: String,
}

#[derive(Debug, Serialize)]
struct ChannelHistory<'a> {
    channel: &'a Record<Channel>,
    messages: &'a [Record<ChatMessage>],
}

fn channel_row(w: &mut dyn Write, c: &Record<Channel>) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}",
        c.id(),
        c.fields.kind,
        c.fields.members.len(),
        c.fields.name
    )
}

fn message_row(w: &mut dyn Write, m: &Record<ChatMessage>) -> io::Result<()> {
    writeln!(w, "{}\t{}\t{}", m.id(), m.fields.sender_name, m.fields.message)
}

/// Dispatch a `bz channel` subcommand.
pub async fn run_channel(
    command: &ChannelCommand,
    workspace: &Workspace,
    output: OutputMode,
) -> anyhow::Result<()> {
    let chat = TeamChat::new(workspace.store(), workspace.session())
        .with_auto_select(workspace.config.chat.auto_select_first_channel);
    ensure_loaded(output, chat.load().await, "channels")?;

    match command {
        ChannelCommand::Create(args) => {
            let created = require_record(output, chat.create_channel(&args.name).await, "channel create")?;
            render(output, &created, |c, w| channel_row(w, c))
        }
        ChannelCommand::List => {
            let channels = chat.channels().snapshot();
            render_mode(
                output,
                channels.as_slice(),
                |items, w| items.iter().try_for_each(|c| channel_row(w, c)),
                |items, w| {
                    pretty_section(w, &format!("Channels ({})", items.len()))?;
                    for c in items {
                        writeln!(w, "#{:<24} {:<8} {}", c.fields.name, c.fields.kind.as_str(), c.id())?;
                    }
                    Ok(())
                },
            )
        }
        ChannelCommand::Post(args) => {
            let id = RecordId::new(args.channel.as_str());
            require_found(output, chat.channels().find(&id), "channel", &id)?;
            ensure_loaded(output, chat.select(&id).await, "channel messages")?;
            let posted = require_record(output, chat.send(&args.text).await, "post")?;
            render(output, &posted, |m, w| message_row(w, m))
        }
        ChannelCommand::Show(args) => {
            let id = RecordId::new(args.channel.as_str());
            require_found(output, chat.channels().find(&id), "channel", &id)?;
            ensure_loaded(output, chat.select(&id).await, "channel messages")?;
            let channel = require_found(output, chat.conversation().selected(), "channel", &id)?;
            let messages = chat.conversation().children();
            let history = ChannelHistory {
                channel: &channel,
                messages: &messages,
            };
            render_mode(
                output,
                &history,
                |h, w| {
                    channel_row(w, h.channel)?;
                    h.messages.iter().try_for_each(|m| message_row(w, m))
                },
                |h, w| {
                    pretty_section(w, &format!("#{} ({})", h.channel.fields.name, h.channel.id()))?;
                    if !h.channel.fields.description.is_empty() {
                        writeln!(w, "{}", h.channel.fields.description)?;
                        writeln!(w)?;
                    }
                    for m in h.messages {
                        writeln!(
                            w,
                            "[{}] {}: {}",
                            m.created_at().format("%H:%M"),
                            m.fields.sender_name,
                            m.fields.message
                        )?;
                    }
                    Ok(())
                },
            )
        }
    }
}
