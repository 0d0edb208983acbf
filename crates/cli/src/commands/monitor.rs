// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory monitor` - Tier 2 LLM monitor agent lifecycle
//!
//! The monitor goes through the same spawn pipeline as every other agent,
//! pinned to the project root with no worktree and no task. Every
//! lifecycle call reconciles the declared session state against actual
//! tmux liveness before acting.

use crate::context::ProjectContext;
use anyhow::Result;
use clap::{Args, Subcommand};
use overstory_adapters::{BeadsTracker, CliGit, CliMulch, SessionAdapter, TmuxAdapter};
use overstory_core::{AgentState, Capability};
use overstory_engine::{spawn, SpawnDeps, SpawnRequest};

const MONITOR_NAME: &str = "monitor";

#[derive(Args)]
pub struct MonitorArgs {
    #[command(subcommand)]
    pub command: MonitorCommand,
}

#[derive(Subcommand)]
pub enum MonitorCommand {
    /// Spawn the monitor agent
    Start {
        /// Permit spawning as uid 0 (containers)
        #[arg(long)]
        allow_root: bool,
    },
    /// Stop the monitor agent
    Stop,
    /// Reconcile and report the monitor's state
    Status,
}

pub async fn monitor(args: &MonitorArgs) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let tmux = TmuxAdapter::new();

    // reconcile declared vs actual on every lifecycle call
    let declared = sessions.get_by_name(MONITOR_NAME)?;
    let actually_alive = match &declared {
        Some(session) if !session.tmux_session.is_empty() => {
            tmux.is_alive(&session.tmux_session).await?
        }
        _ => false,
    };
    if let Some(session) = &declared {
        if !session.state.is_terminal() && !actually_alive {
            sessions.update_state(MONITOR_NAME, AgentState::Zombie)?;
        }
    }
    let running = declared
        .as_ref()
        .map(|s| !s.state.is_terminal() && actually_alive)
        .unwrap_or(false);

    match &args.command {
        MonitorCommand::Start { allow_root } => {
            if running {
                println!("monitor already running");
                return Ok(());
            }
            let events = ctx.events()?;
            let root = ctx.paths.project_root().to_path_buf();
            let git = CliGit::new(&root);
            let tracker = BeadsTracker::new(&ctx.config.tracker_cmd, &root);
            let mulch = CliMulch::new(&ctx.config.mulch_cmd, &root);

            let request = SpawnRequest {
                bypass_hierarchy: true,
                allow_root: *allow_root,
                ..SpawnRequest::new("", Capability::Monitor, MONITOR_NAME)
            };
            let deps = SpawnDeps {
                config: &ctx.config,
                manifest: &ctx.manifest,
                paths: &ctx.paths,
                sessions: &sessions,
                events: &events,
                session_adapter: &tmux,
                git: &git,
                tracker: &tracker,
                mulch: &mulch,
                clock: &ctx.clock,
            };
            let outcome = spawn(&request, &deps).await?;
            for warning in &outcome.warnings {
                eprintln!("warning: {warning}");
            }
            println!("monitor started [{}]", outcome.tmux_session);
            events.close();
        }
        MonitorCommand::Stop => {
            let Some(session) = declared else {
                println!("monitor is not running");
                return Ok(());
            };
            if actually_alive {
                tmux.kill(&session.tmux_session).await?;
            }
            if !session.state.is_terminal() {
                sessions.update_state(MONITOR_NAME, AgentState::Completed)?;
            }
            println!("monitor stopped");
        }
        MonitorCommand::Status => match declared {
            Some(session) if running => {
                println!("monitor running [{}]", session.tmux_session)
            }
            Some(session) => println!("monitor not running (last state {})", session.state),
            None => println!("monitor has never been started"),
        },
    }

    sessions.close();
    Ok(())
}
