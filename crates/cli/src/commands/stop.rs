// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory stop` - Explicit terminal transition for one agent

use crate::context::ProjectContext;
use anyhow::{bail, Result};
use clap::Args;
use overstory_adapters::{CliGit, GitAdapter, SessionAdapter, TmuxAdapter};
use overstory_core::{iso_utc, AgentState, EventType, NewEvent, TaskRecord};
use overstory_engine::{identity, WorktreeManager};

#[derive(Args)]
pub struct StopArgs {
    /// Agent name
    pub agent: String,

    /// Also remove the agent's worktree and branch
    #[arg(long)]
    pub clean_worktree: bool,

    /// One-line summary recorded into the agent's identity history
    #[arg(long)]
    pub summary: Option<String>,
}

pub async fn stop(args: &StopArgs) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let events = ctx.events()?;

    let Some(session) = sessions.get_by_name(&args.agent)? else {
        bail!("no session named {}", args.agent);
    };
    if session.state.is_terminal() {
        println!("{} is already {}", session.name, session.state);
        return Ok(());
    }

    let tmux = TmuxAdapter::new();
    if !session.tmux_session.is_empty() && tmux.is_alive(&session.tmux_session).await? {
        tmux.kill(&session.tmux_session).await?;
    }

    sessions.update_state(&session.name, AgentState::Completed)?;
    let now_ms = ctx.now_ms();
    if let Err(e) = events.append(
        &NewEvent {
            run_id: session.run_id.as_ref().map(|r| r.to_string()),
            agent_name: session.name.clone(),
            event_type: Some(EventType::SessionEnd),
            ..NewEvent::default()
        },
        now_ms,
    ) {
        tracing::warn!(error = %e, "session_end event insert failed (non-fatal)");
    }

    if !session.task_id.is_empty() {
        identity::record_completion(
            &ctx.paths,
            &session.name,
            TaskRecord {
                task_id: session.task_id.clone(),
                summary: args
                    .summary
                    .clone()
                    .unwrap_or_else(|| "stopped by operator".into()),
                completed_at: iso_utc(now_ms),
            },
            &[],
        )?;
    }

    if args.clean_worktree && !session.branch.is_empty() {
        let git = CliGit::new(ctx.paths.project_root());
        let merged = git
            .is_branch_merged(&session.branch, &ctx.config.canonical_branch)
            .await
            .unwrap_or(false);
        let manager = WorktreeManager::new(
            git,
            ctx.paths.clone(),
            ctx.config.canonical_branch.clone(),
        );
        manager
            .remove(&session.worktree_path, &session.branch, merged, !merged)
            .await?;
        println!("removed worktree {}", session.worktree_path.display());
    }

    println!("stopped {}", session.name);
    sessions.close();
    events.close();
    Ok(())
}
