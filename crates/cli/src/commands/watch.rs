// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory watch` - Tier 0/1 watchdog

use crate::context::ProjectContext;
use anyhow::Result;
use clap::Args;
use overstory_adapters::TmuxAdapter;
use overstory_core::SystemClock;
use overstory_engine::watchdog::{remove_pid_file, write_pid_file};
use overstory_engine::{Watchdog, WatchdogConfig};
use std::time::Duration;

/// Child marker so the background parent and the worker don't recurse.
const CHILD_ENV: &str = "OVERSTORY_WATCH_CHILD";

#[derive(Args)]
pub struct WatchArgs {
    /// Poll interval in milliseconds (defaults to config pollIntervalMs)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Detach into the background (writes .overstory/watchdog.pid)
    #[arg(long)]
    pub background: bool,

    /// Tier 1: mail fleet summaries to the coordinator each pass
    #[arg(long)]
    pub summaries: bool,
}

pub async fn watch(args: &WatchArgs) -> Result<()> {
    let ctx = ProjectContext::discover()?;

    if args.background && std::env::var(CHILD_ENV).is_err() {
        return spawn_background(args, &ctx);
    }

    let config = WatchdogConfig {
        poll_interval_ms: args.interval.unwrap_or(ctx.config.poll_interval_ms),
        stale_threshold_ms: ctx.config.stale_threshold_ms,
        zombie_threshold_ms: ctx.config.zombie_threshold_ms,
        nudge_interval_ms: ctx.config.nudge_interval_ms,
        coordinator_summaries: args.summaries,
    };

    let pid_path = ctx.paths.watchdog_pid();
    if args.background {
        // we are the detached child
        write_pid_file(&pid_path, std::process::id())?;
    }

    let sessions = ctx.sessions()?;
    let mail = ctx.mail()?;
    let mut watchdog = Watchdog::new(config.clone(), TmuxAdapter::new(), SystemClock);

    let mut ticker = tokio::time::interval(Duration::from_millis(config.poll_interval_ms.max(100)));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                remove_pid_file(&pid_path);
                eprintln!("watchdog stopped");
                return Ok(());
            }
            _ = ticker.tick() => {
                match watchdog.run_once(&sessions, &mail).await {
                    Ok(checks) => {
                        for check in &checks {
                            if check.action != overstory_engine::WatchAction::Ok {
                                println!(
                                    "{}: {} (tmux {}, action {}){}",
                                    check.agent_name,
                                    check.state,
                                    if check.tmux_alive { "alive" } else { "dead" },
                                    check.action.as_str(),
                                    check
                                        .note
                                        .as_ref()
                                        .map(|n| format!(" - {n}"))
                                        .unwrap_or_default(),
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "watchdog pass failed");
                    }
                }
            }
        }
    }
}

/// Re-exec ourselves detached; the child writes the PID file (and refuses
/// to start when a live watchdog already owns it).
fn spawn_background(args: &WatchArgs, ctx: &ProjectContext) -> Result<()> {
    use overstory_engine::watchdog::{pid_alive, read_pid_file};

    let pid_path = ctx.paths.watchdog_pid();
    if let Some(existing) = read_pid_file(&pid_path) {
        if pid_alive(existing).unwrap_or(false) {
            anyhow::bail!("watchdog already running with pid {existing}");
        }
    }

    let exe = std::env::current_exe()?;
    let log_path = ctx.paths.logs_dir().join("watchdog.log");
    std::fs::create_dir_all(ctx.paths.logs_dir())?;
    let log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let mut cmd = std::process::Command::new(exe);
    cmd.arg("watch")
        .arg("--background")
        .env(CHILD_ENV, "1")
        .current_dir(ctx.paths.project_root())
        .stdin(std::process::Stdio::null())
        .stdout(log.try_clone()?)
        .stderr(log);
    if let Some(interval) = args.interval {
        cmd.arg("--interval").arg(interval.to_string());
    }
    if args.summaries {
        cmd.arg("--summaries");
    }

    let child = cmd.spawn()?;
    println!(
        "watchdog started in background (pid {}, log {})",
        child.id(),
        log_path.display()
    );
    Ok(())
}
