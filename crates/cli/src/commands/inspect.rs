// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory inspect` - Detail view of one agent

use crate::context::ProjectContext;
use anyhow::{bail, Result};
use clap::Args;
use overstory_core::{format_elapsed_ms, iso_utc};
use overstory_engine::inspect::derive_current_file;
use overstory_store::EventQuery;

#[derive(Args)]
pub struct InspectArgs {
    /// Agent name
    pub agent: String,

    /// Number of recent events to show
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: u32,
}

pub async fn inspect(args: &InspectArgs, json: bool) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let events = ctx.events()?;
    let mail = ctx.mail()?;

    let Some(session) = sessions.get_by_name(&args.agent)? else {
        bail!("no session named {}", args.agent);
    };

    let recent = events.get_by_agent(
        &args.agent,
        &EventQuery {
            limit: Some(args.limit),
            ..EventQuery::default()
        },
    )?;
    let current_file = derive_current_file(&recent);
    let unread = mail.unread_count(&args.agent)?;
    let identity = overstory_engine::identity::load(&ctx.paths, &args.agent)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "session": session,
                "currentFile": current_file,
                "unreadMail": unread,
                "identity": identity,
                "events": recent,
            }))?
        );
        return Ok(());
    }

    let now_ms = ctx.now_ms();
    println!("{} ({})", session.name, session.capability);
    println!("  state:     {}", session.state);
    println!(
        "  task:      {}",
        if session.task_id.is_empty() {
            "-"
        } else {
            &session.task_id
        }
    );
    println!("  branch:    {}", session.branch);
    println!("  worktree:  {}", session.worktree_path.display());
    println!("  tmux:      {}", session.tmux_session);
    println!(
        "  idle:      {}",
        format_elapsed_ms(now_ms.saturating_sub(session.last_activity).max(0) as u64)
    );
    println!("  escalation: {}", session.escalation_level);
    if let Some(file) = &current_file {
        println!("  current file: {file}");
    }
    println!("  unread mail: {unread}");
    if let Some(identity) = &identity {
        println!(
            "  identity:  {} sessions, domains: {}",
            identity.sessions_completed,
            if identity.expertise_domains.is_empty() {
                "-".to_string()
            } else {
                identity.expertise_domains.join(", ")
            }
        );
    }

    if !recent.is_empty() {
        println!("recent events:");
        for event in &recent {
            let tool = event.tool_name.as_deref().unwrap_or("-");
            println!(
                "  {} {:<13} {}",
                iso_utc(event.created_at),
                event.event_type.to_string(),
                tool
            );
        }
    }

    Ok(())
}
