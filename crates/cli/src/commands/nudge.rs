// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory nudge` - Manual nudge of one agent

use crate::context::ProjectContext;
use anyhow::{bail, Result};
use clap::Args;
use overstory_adapters::{SessionAdapter, TmuxAdapter};
use overstory_core::{MessageType, Priority};
use overstory_store::NewMessage;

#[derive(Args)]
pub struct NudgeArgs {
    /// Agent name
    pub agent: String,

    /// Custom nudge text
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

pub async fn nudge(args: &NudgeArgs) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let mail = ctx.mail()?;

    let Some(session) = sessions.get_by_name(&args.agent)? else {
        bail!("no session named {}", args.agent);
    };
    if session.state.is_terminal() {
        bail!("{} is {} and cannot be nudged", session.name, session.state);
    }

    let text = args.message.clone().unwrap_or_else(|| {
        format!(
            "[OVERSTORY nudge] {}: operator requests a status update. \
             Check mail and resume your task.",
            session.name
        )
    });

    let tmux = TmuxAdapter::new();
    if !tmux.is_alive(&session.tmux_session).await? {
        bail!("tmux session {} is not alive", session.tmux_session);
    }
    tmux.send_literal(&session.tmux_session, &text).await?;
    tmux.send_enter(&session.tmux_session).await?;

    mail.send(
        NewMessage {
            from: "system".into(),
            to: session.name.clone(),
            subject: "manual nudge".into(),
            body: text,
            message_type: Some(MessageType::Status),
            priority: Some(Priority::High),
            ..NewMessage::default()
        },
        ctx.now_ms(),
    )?;

    println!("nudged {}", session.name);
    sessions.close();
    mail.close();
    Ok(())
}
