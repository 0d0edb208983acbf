// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory log` / `logs` / `trace` - Event log entry points
//!
//! `log` is the hook entry point: it must stay cheap (one insert) and
//! update the session's activity clock so the watchdog sees life.

use crate::context::ProjectContext;
use anyhow::Result;
use clap::Args;
use overstory_core::{iso_utc, EventLevel, EventType};
use overstory_store::EventQuery;
use std::str::FromStr;

#[derive(Args)]
pub struct LogArgs {
    /// Event type (tool_start, tool_end, session_start, session_end,
    /// mail_sent, mail_received, spawn, error, custom)
    pub event: String,

    /// Agent name; defaults to $OVERSTORY_AGENT_NAME
    #[arg(long)]
    pub agent: Option<String>,

    #[arg(long)]
    pub tool: Option<String>,

    /// Opaque tool arguments (JSON from the hook)
    #[arg(long)]
    pub args: Option<String>,

    #[arg(long)]
    pub duration_ms: Option<i64>,

    #[arg(long, default_value = "info")]
    pub level: String,

    #[arg(long)]
    pub data: Option<String>,

    #[arg(long)]
    pub session_id: Option<String>,
}

pub async fn log(args: &LogArgs) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let events = ctx.events()?;
    let sessions = ctx.sessions()?;

    let agent = match &args.agent {
        Some(agent) => agent.clone(),
        None => std::env::var("OVERSTORY_AGENT_NAME")
            .map_err(|_| anyhow::anyhow!("--agent or OVERSTORY_AGENT_NAME is required"))?,
    };
    let event_type = EventType::from_str(&args.event).map_err(|e| anyhow::anyhow!(e))?;
    let level = EventLevel::from_str(&args.level).map_err(|e| anyhow::anyhow!(e))?;

    let now_ms = ctx.now_ms();
    let session = sessions.get_by_name(&agent)?;
    let run_id = session
        .as_ref()
        .and_then(|s| s.run_id.as_ref())
        .map(|r| r.to_string());

    events.append(
        &overstory_core::NewEvent {
            run_id,
            agent_name: agent.clone(),
            session_id: args.session_id.clone(),
            event_type: Some(event_type),
            tool_name: args.tool.clone(),
            tool_args: args.args.clone(),
            duration_ms: args.duration_ms,
            level: Some(level),
            data: args.data.clone(),
        },
        now_ms,
    )?;

    // hook activity drives the state machine: booting -> working, and the
    // watchdog's staleness clock resets
    if let Some(session) = session {
        let _ = sessions.update_last_activity(&agent, now_ms);
        if session.state == overstory_core::AgentState::Booting {
            let _ = sessions.update_state(&agent, overstory_core::AgentState::Working);
        }
    }

    events.close();
    sessions.close();
    Ok(())
}

#[derive(Args)]
pub struct LogsArgs {
    /// Agent name; the global timeline when omitted
    pub agent: Option<String>,

    #[arg(short = 'n', long, default_value_t = 50)]
    pub limit: u32,
}

pub async fn logs(args: &LogsArgs, json: bool) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let events = ctx.events()?;

    let query = EventQuery {
        limit: Some(args.limit),
        ..EventQuery::default()
    };
    let rows = match &args.agent {
        Some(agent) => events.get_by_agent(agent, &query)?,
        None => events.get_timeline(&query)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for event in &rows {
        println!(
            "{} {:<16} {:<13} {}",
            iso_utc(event.created_at),
            event.agent_name,
            event.event_type.to_string(),
            event.tool_name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

#[derive(Args)]
pub struct TraceArgs {
    /// Agent name or task id
    pub target: String,

    #[arg(short = 'n', long, default_value_t = 200)]
    pub limit: u32,
}

pub async fn trace(args: &TraceArgs, json: bool) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let events = ctx.events()?;

    let query = EventQuery {
        limit: Some(args.limit),
        ..EventQuery::default()
    };

    // an agent name (session row or logged events) wins; otherwise treat
    // the target as a task id and trace every agent that held it
    let mut rows = events.get_by_agent(&args.target, &query)?;
    if rows.is_empty() && sessions.get_by_name(&args.target)?.is_none() {
        let holders: Vec<String> = sessions
            .get_all()?
            .into_iter()
            .filter(|s| s.task_id == args.target)
            .map(|s| s.name)
            .collect();
        if holders.is_empty() {
            anyhow::bail!("nothing named {} (agent or task)", args.target);
        }
        for agent in &holders {
            rows.extend(events.get_by_agent(agent, &query)?);
        }
        rows.sort_by_key(|e| (e.created_at, e.id));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for event in &rows {
        let detail = event
            .tool_name
            .as_deref()
            .or(event.data.as_deref())
            .unwrap_or("");
        println!(
            "{} {:<16} {:<13} {} {}",
            iso_utc(event.created_at),
            event.agent_name,
            event.event_type.to_string(),
            event.level,
            detail,
        );
    }
    Ok(())
}
