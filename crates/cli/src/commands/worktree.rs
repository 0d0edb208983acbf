// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory worktree` - Worktree management

use crate::context::ProjectContext;
use anyhow::Result;
use clap::{Args, Subcommand};
use overstory_adapters::{CliGit, GitAdapter, TmuxAdapter};
use overstory_engine::{CleanOptions, WorktreeManager};

#[derive(Args)]
pub struct WorktreeArgs {
    #[command(subcommand)]
    pub command: WorktreeCommand,
}

#[derive(Subcommand)]
pub enum WorktreeCommand {
    /// List overstory worktrees
    List,
    /// Clean retired worktrees
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct CleanArgs {
    /// Only clean worktrees whose session reached a terminal state
    #[arg(long, conflicts_with = "all")]
    pub completed: bool,

    /// Consider every overstory worktree (default)
    #[arg(long)]
    pub all: bool,

    /// Remove unmerged non-lead branches too
    #[arg(long)]
    pub force: bool,
}

pub async fn worktree(args: &WorktreeArgs) -> Result<()> {
    match &args.command {
        WorktreeCommand::List => list().await,
        WorktreeCommand::Clean(clean_args) => clean(clean_args).await,
    }
}

async fn list() -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let git = CliGit::new(ctx.paths.project_root());

    let mut found = false;
    for worktree in git.worktree_list().await? {
        let Some(branch) = &worktree.branch else {
            continue;
        };
        if !branch.starts_with("overstory/") {
            continue;
        }
        found = true;
        println!("{}  {}  {}", &worktree.head[..12.min(worktree.head.len())], branch, worktree.path.display());
    }
    if !found {
        println!("no overstory worktrees");
    }
    Ok(())
}

pub async fn clean(args: &CleanArgs) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;
    let mail = ctx.mail()?;
    let git = CliGit::new(ctx.paths.project_root());
    let tmux = TmuxAdapter::new();

    let manager = WorktreeManager::new(
        git,
        ctx.paths.clone(),
        ctx.config.canonical_branch.clone(),
    );
    let options = CleanOptions {
        completed_only: args.completed,
        force: args.force,
    };

    let report = manager.clean(&options, &sessions, &mail, &tmux).await?;

    println!(
        "Cleaned {} worktree{}",
        report.cleaned,
        if report.cleaned == 1 { "" } else { "s" }
    );
    if !report.skipped.is_empty() {
        println!(
            "Skipped {} worktree{} (unmerged):",
            report.skipped.len(),
            if report.skipped.len() == 1 { "" } else { "s" }
        );
        for branch in &report.skipped {
            println!("  {branch}");
        }
        println!("re-run with --force to remove them");
    }
    if report.failed > 0 {
        println!("Failed {}", report.failed);
    }
    if report.pruned > 0 {
        println!("Pruned {} stale session row{}", report.pruned, if report.pruned == 1 { "" } else { "s" });
    }
    if report.mail_purged > 0 {
        println!("Purged {} mail message{}", report.mail_purged, if report.mail_purged == 1 { "" } else { "s" });
    }
    if report.seeds_preserved > 0 {
        println!("Preserved .seeds/ changes from {} lead{}", report.seeds_preserved, if report.seeds_preserved == 1 { "" } else { "s" });
    }

    sessions.close();
    mail.close();
    Ok(())
}
