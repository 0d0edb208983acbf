// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory sling` - Spawn an agent onto a tracker task

use crate::context::ProjectContext;
use anyhow::Result;
use clap::Args;
use overstory_adapters::{BeadsTracker, CliGit, CliMulch, TmuxAdapter};
use overstory_core::Capability;
use overstory_engine::{spawn, SpawnDeps, SpawnRequest};
use std::path::PathBuf;

#[derive(Args)]
pub struct SlingArgs {
    /// Tracker task id the agent will own
    pub task_id: String,

    /// Agent capability
    #[arg(long, short = 'c', default_value = "lead")]
    pub capability: Capability,

    /// Agent name; derived from the capability when omitted
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Parent agent name (required for everything but leads)
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    /// Hierarchy depth
    #[arg(long, short = 'd', default_value_t = 0)]
    pub depth: u32,

    /// Paths the agent should stay within (repeatable)
    #[arg(long = "file-scope", value_name = "PATH")]
    pub file_scope: Vec<String>,

    /// Task spec file injected into the overlay
    #[arg(long)]
    pub spec: Option<PathBuf>,

    /// Skip the tracker issue-state validation
    #[arg(long)]
    pub skip_tracker_check: bool,

    /// Emergency bypass for the parentless-must-be-lead rule
    #[arg(long)]
    pub bypass_hierarchy: bool,

    /// Waive the builder-needs-a-scout convention
    #[arg(long)]
    pub skip_scout: bool,

    /// Quality gate descriptions for the overlay (repeatable)
    #[arg(long = "gate", value_name = "DESC")]
    pub quality_gates: Vec<String>,

    /// Permit spawning as uid 0 (containers)
    #[arg(long)]
    pub allow_root: bool,
}

pub async fn sling(args: &SlingArgs, json: bool) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let events = ctx.events()?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => derive_name(args.capability, &sessions)?,
    };

    let request = SpawnRequest {
        task_id: args.task_id.clone(),
        capability: args.capability,
        name,
        parent: args.parent.clone(),
        depth: args.depth,
        file_scope: args.file_scope.clone(),
        spec_path: args.spec.clone(),
        skip_tracker_check: args.skip_tracker_check,
        bypass_hierarchy: args.bypass_hierarchy,
        skip_scout: args.skip_scout,
        quality_gates: args.quality_gates.clone(),
        allow_root: args.allow_root,
    };

    let root = ctx.paths.project_root().to_path_buf();
    let session_adapter = TmuxAdapter::new();
    let git = CliGit::new(&root);
    let tracker = BeadsTracker::new(&ctx.config.tracker_cmd, &root);
    let mulch = CliMulch::new(&ctx.config.mulch_cmd, &root);

    let deps = SpawnDeps {
        config: &ctx.config,
        manifest: &ctx.manifest,
        paths: &ctx.paths,
        sessions: &sessions,
        events: &events,
        session_adapter: &session_adapter,
        git: &git,
        tracker: &tracker,
        mulch: &mulch,
        clock: &ctx.clock,
    };

    let outcome = spawn(&request, &deps).await?;
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "agent": outcome.agent,
                "capability": outcome.capability,
                "taskId": outcome.task_id,
                "branch": outcome.branch,
                "worktree": outcome.worktree_path,
                "tmuxSession": outcome.tmux_session,
                "runId": outcome.run_id,
                "pid": outcome.pid,
                "tuiReady": outcome.tui_ready,
            }))?
        );
    } else {
        println!(
            "spawned {} ({}) on task {} [{}]",
            outcome.agent, outcome.capability, outcome.task_id, outcome.tmux_session
        );
        println!("  branch:   {}", outcome.branch);
        println!("  worktree: {}", outcome.worktree_path.display());
        println!("  run:      {}", outcome.run_id);
    }

    sessions.close();
    events.close();
    Ok(())
}

/// `builder-1`, `builder-2`, … first free ordinal for the capability.
fn derive_name(
    capability: Capability,
    sessions: &overstory_store::SessionStore,
) -> Result<String> {
    let taken: Vec<String> = sessions.get_all()?.into_iter().map(|s| s.name).collect();
    for n in 1..1000 {
        let candidate = format!("{capability}-{n}");
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
    }
    anyhow::bail!("no free name for capability {capability}")
}
