// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail operations above the store: group addressing, reply routing, and
//! the formatted inbox block injected by hooks.

use crate::error::EngineError;
use overstory_core::{AgentSession, Capability, MailMessage};
use overstory_store::{MailStore, MailStoreError, NewMessage};
use std::str::FromStr;

/// Resolve a recipient expression into concrete agent names.
///
/// Recipients beginning with `@` are case-insensitive group addresses:
/// `@all` is every active agent except the sender; `@<capability>` (plural
/// tolerated) is every active agent of that capability except the sender.
/// Zero recipients and unknown groups are errors.
pub fn resolve_recipients(
    to: &str,
    sender: &str,
    active: &[AgentSession],
) -> Result<Vec<String>, EngineError> {
    let Some(group) = to.strip_prefix('@') else {
        return Ok(vec![to.to_string()]);
    };
    let group = group.to_ascii_lowercase();

    let names: Vec<String> = if group == "all" {
        active
            .iter()
            .filter(|s| s.name != sender)
            .map(|s| s.name.clone())
            .collect()
    } else {
        let singular = group.strip_suffix('s').unwrap_or(&group);
        let capability = Capability::from_str(singular).map_err(|_| {
            EngineError::Group(format!(
                "unknown group @{group} (valid: @all, {})",
                Capability::names()
                    .iter()
                    .map(|n| format!("@{n}s"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;
        active
            .iter()
            .filter(|s| s.capability == capability && s.name != sender)
            .map(|s| s.name.clone())
            .collect()
    };

    if names.is_empty() {
        return Err(EngineError::Group(format!(
            "group @{group} resolved to zero recipients"
        )));
    }
    Ok(names)
}

/// Send one message per resolved recipient. Returns the stored messages.
pub fn send_resolved(
    mail: &MailStore,
    active: &[AgentSession],
    message: NewMessage,
    now_ms: i64,
) -> Result<Vec<MailMessage>, EngineError> {
    let recipients = resolve_recipients(&message.to, &message.from, active)?;
    let mut sent = Vec::new();
    for recipient in recipients {
        sent.push(mail.send(
            NewMessage {
                id: String::new(),
                to: recipient,
                ..message.clone()
            },
            now_ms,
        )?);
    }
    Ok(sent)
}

/// Reply to a message. The recipient is "the other side": when the replier
/// is the original sender the reply goes to the original recipient,
/// otherwise to the original sender. Type and priority are copied; the
/// thread is the original's thread or the original itself.
pub fn reply(
    mail: &MailStore,
    original_id: &str,
    from: &str,
    body: &str,
    now_ms: i64,
) -> Result<MailMessage, EngineError> {
    let original = mail
        .get(original_id)?
        .ok_or_else(|| EngineError::Mail(MailStoreError::MessageNotFound(original_id.to_string())))?;

    let to = if original.from == from {
        original.to.clone()
    } else {
        original.from.clone()
    };

    Ok(mail.send(
        NewMessage {
            id: String::new(),
            from: from.to_string(),
            to,
            subject: format!("Re: {}", original.subject),
            body: body.to_string(),
            message_type: Some(original.message_type),
            priority: Some(original.priority),
            thread_id: Some(
                original
                    .thread_id
                    .clone()
                    .unwrap_or_else(|| original.id.clone()),
            ),
            payload: None,
        },
        now_ms,
    )?)
}

/// Drain and format the inbox for hook injection. An empty inbox yields an
/// empty string (the hook then injects nothing).
pub fn check_formatted(mail: &mut MailStore, agent: &str) -> Result<String, EngineError> {
    let messages = mail.check(agent)?;
    Ok(format_inbox(agent, &messages))
}

/// Human-readable inbox block: count header, `---`-delimited messages,
/// priority tag when non-normal, payload line for protocol types, and a
/// suggested reply command.
pub fn format_inbox(agent: &str, messages: &[MailMessage]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "You have {} unread message{}:\n",
        messages.len(),
        if messages.len() == 1 { "" } else { "s" }
    );
    for msg in messages {
        out.push_str("---\n");
        if msg.priority == overstory_core::Priority::Normal {
            out.push_str(&format!("From: {}\n", msg.from));
        } else {
            out.push_str(&format!("From: {} [{}]\n", msg.from, msg.priority));
        }
        out.push_str(&format!("Type: {}\n", msg.message_type));
        out.push_str(&format!("Subject: {}\n", msg.subject));
        out.push_str(&format!("{}\n", msg.body));
        if msg.message_type.is_protocol() {
            if let Some(payload) = &msg.payload {
                out.push_str(&format!("Payload: {}\n", payload));
            }
        }
        out.push_str(&format!(
            "Reply: overstory mail reply {} --from {} --body \"…\"\n",
            msg.id, agent
        ));
    }
    out
}

#[cfg(test)]
#[path = "mailops_tests.rs"]
mod tests;
