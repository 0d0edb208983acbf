// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory run` - Run registry

use crate::context::ProjectContext;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use overstory_core::{format_elapsed_ms, iso_utc, RunId, RunStatus};
use overstory_engine::runs::clear_pointer_if_current;

#[derive(Args)]
pub struct RunArgs {
    #[command(subcommand)]
    pub command: RunCommand,
}

#[derive(Subcommand)]
pub enum RunCommand {
    /// List runs, newest first
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: u32,
        /// Filter by status (active, completed, failed)
        #[arg(long)]
        status: Option<RunStatus>,
    },
    /// Show one run and its agents
    Show {
        /// Run id
        id: String,
    },
    /// Close a run
    Complete {
        /// Run id; the active run when omitted
        id: Option<String>,
        /// Close as failed instead of completed
        #[arg(long)]
        failed: bool,
    },
}

pub async fn run(args: &RunArgs, json: bool) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;

    match &args.command {
        RunCommand::List { limit, status } => {
            let runs = sessions.list_runs(Some(*limit), *status)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else if runs.is_empty() {
                println!("no runs");
            } else {
                for run in &runs {
                    println!(
                        "{} {:<10} {} agents, started {}",
                        run.id,
                        run.status.to_string(),
                        run.agent_count,
                        iso_utc(run.started_at),
                    );
                }
            }
        }
        RunCommand::Show { id } => {
            let run_id = RunId::new(id.clone());
            let Some(run) = sessions.get_run(&run_id)? else {
                bail!("no run with id {id}");
            };
            let agents = sessions.get_by_run(&run_id)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "run": run,
                        "agents": agents,
                    }))?
                );
            } else {
                println!(
                    "{} {} ({} agents, started {})",
                    run.id,
                    run.status,
                    run.agent_count,
                    iso_utc(run.started_at)
                );
                for agent in &agents {
                    println!(
                        "  {:<16} {:<12} {:<10} {}",
                        agent.name,
                        agent.capability.to_string(),
                        agent.state.to_string(),
                        if agent.task_id.is_empty() {
                            "-"
                        } else {
                            &agent.task_id
                        }
                    );
                }
            }
        }
        RunCommand::Complete { id, failed } => {
            let run_id = match id {
                Some(id) => RunId::new(id.clone()),
                None => match sessions.get_active_run()? {
                    Some(run) => run.id,
                    None => bail!("no active run to complete"),
                },
            };
            let status = if *failed {
                RunStatus::Failed
            } else {
                RunStatus::Completed
            };
            let now_ms = ctx.now_ms();
            sessions.complete_run(&run_id, status, now_ms)?;
            clear_pointer_if_current(&ctx.paths, &run_id);
            let run = sessions.get_run(&run_id)?;
            if let Some(run) = run {
                println!(
                    "run {} {} after {}",
                    run.id,
                    status,
                    format_elapsed_ms(now_ms.saturating_sub(run.started_at).max(0) as u64)
                );
            }
        }
    }

    sessions.close();
    Ok(())
}
