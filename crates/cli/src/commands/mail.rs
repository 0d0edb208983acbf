// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory mail` - Inter-agent mail

use crate::context::ProjectContext;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use overstory_core::{iso_utc, MessageType, Priority, ProtocolPayload};
use overstory_engine::{mailops, EngineError};
use overstory_store::{MailPurge, MailStoreError, NewMessage};
use std::str::FromStr;

/// Surface store failures under the `mail` error code.
fn mail_err(e: MailStoreError) -> anyhow::Error {
    EngineError::Mail(e).into()
}

#[derive(Args)]
pub struct MailArgs {
    #[command(subcommand)]
    pub command: MailCommand,
}

#[derive(Subcommand)]
pub enum MailCommand {
    /// Send a message (recipient may be @all or @<capability>)
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
        /// Message type (status, question, result, error, or a protocol type)
        #[arg(long = "type", value_name = "TYPE")]
        message_type: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        thread: Option<String>,
        /// JSON protocol payload; its type tag must match --type
        #[arg(long)]
        payload: Option<String>,
    },
    /// Drain an agent's unread mail (hook injection format with --format)
    Check {
        #[arg(long)]
        agent: String,
        /// Emit the hook-injection text block instead of a listing
        #[arg(long)]
        format: bool,
    },
    /// List messages, newest first
    List {
        #[arg(long)]
        agent: Option<String>,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: u32,
    },
    /// Mark one message read
    Read {
        /// Message id
        id: String,
    },
    /// Reply to a message
    Reply {
        /// Original message id
        id: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        body: String,
    },
    /// Delete mail by sender, recipient, or everything
    Purge {
        #[arg(long, conflicts_with_all = ["agent", "all"])]
        from: Option<String>,
        #[arg(long, conflicts_with = "all")]
        agent: Option<String>,
        #[arg(long)]
        all: bool,
    },
}

pub async fn mail(args: &MailArgs, json: bool) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let mut mail = ctx.mail()?;
    let now_ms = ctx.now_ms();

    match &args.command {
        MailCommand::Send {
            from,
            to,
            subject,
            body,
            message_type,
            priority,
            thread,
            payload,
        } => {
            let message_type = message_type
                .as_deref()
                .map(MessageType::from_str)
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;
            let priority = priority
                .as_deref()
                .map(Priority::from_str)
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;

            // a protocol payload must parse and agree with the declared type
            if let Some(raw) = payload {
                let parsed: ProtocolPayload = serde_json::from_str(raw)?;
                if let Some(declared) = message_type {
                    if parsed.message_type() != declared {
                        bail!(
                            "payload type {} does not match --type {declared}",
                            parsed.message_type()
                        );
                    }
                }
            }

            let active = sessions.get_active()?;
            let sent = mailops::send_resolved(
                &mail,
                &active,
                NewMessage {
                    id: String::new(),
                    from: from.clone(),
                    to: to.clone(),
                    subject: subject.clone(),
                    body: body.clone(),
                    message_type,
                    priority,
                    thread_id: thread.clone(),
                    payload: payload.clone(),
                },
                now_ms,
            )?;
            for msg in &sent {
                println!("sent {} to {}", msg.id, msg.to);
            }
        }
        MailCommand::Check { agent, format } => {
            if *format {
                // hook injection: empty inbox prints nothing at all
                print!("{}", mailops::check_formatted(&mut mail, agent)?);
            } else {
                let messages = mail.check(agent).map_err(mail_err)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&messages)?);
                } else if messages.is_empty() {
                    println!("no unread mail for {agent}");
                } else {
                    for msg in &messages {
                        println!(
                            "{} {} from {} [{}] {}",
                            iso_utc(msg.created_at),
                            msg.id,
                            msg.from,
                            msg.message_type,
                            msg.subject
                        );
                    }
                }
            }
        }
        MailCommand::List { agent, limit } => {
            let messages = mail.list(agent.as_deref(), *limit).map_err(mail_err)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
            } else {
                for msg in &messages {
                    println!(
                        "{} {} {} -> {} [{}{}] {}",
                        iso_utc(msg.created_at),
                        msg.id,
                        msg.from,
                        msg.to,
                        msg.message_type,
                        if msg.read { ", read" } else { "" },
                        msg.subject
                    );
                }
            }
        }
        MailCommand::Read { id } => {
            let already = mail.mark_read(id).map_err(mail_err)?;
            if already {
                println!("{id} was already read");
            } else {
                println!("marked {id} read");
            }
        }
        MailCommand::Reply { id, from, body } => {
            let sent = mailops::reply(&mail, id, from, body, now_ms)?;
            println!("sent {} to {}", sent.id, sent.to);
        }
        MailCommand::Purge { from, agent, all } => {
            let filter = match (from, agent, all) {
                (Some(sender), None, false) => MailPurge::From(sender.clone()),
                (None, Some(agent), false) => MailPurge::To(agent.clone()),
                (None, None, true) => MailPurge::All,
                _ => bail!("purge needs exactly one of --from, --agent, --all"),
            };
            let purged = mail.purge(&filter).map_err(mail_err)?;
            println!("purged {purged} message{}", if purged == 1 { "" } else { "s" });
        }
    }

    sessions.close();
    mail.close();
    Ok(())
}
