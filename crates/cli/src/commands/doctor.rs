// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory doctor` - Environment checks

use crate::context::ProjectContext;
use anyhow::Result;
use overstory_adapters::{SessionAdapter, TmuxAdapter};
use std::process::Command;

pub async fn doctor() -> Result<()> {
    let mut healthy = true;

    let ctx = match ProjectContext::discover() {
        Ok(ctx) => {
            report(true, "project", ".overstory/ found");
            Some(ctx)
        }
        Err(_) => {
            report(false, "project", "not initialized (run overstory init)");
            healthy = false;
            None
        }
    };

    healthy &= check_binary("git", &["--version"]);
    match TmuxAdapter::new().preflight().await {
        Ok(()) => report(true, "tmux", "available"),
        Err(e) => {
            report(false, "tmux", &e.to_string());
            healthy = false;
        }
    }

    if let Some(ctx) = &ctx {
        // the tracker and mulch are optional collaborators: their absence
        // degrades spawning, it does not break the orchestrator
        check_binary(&ctx.config.tracker_cmd, &["--version"]);
        check_binary(&ctx.config.mulch_cmd, &["--version"]);
        check_binary(&ctx.config.agent_cmd, &["--version"]);

        match ctx.sessions() {
            Ok(store) => {
                report(true, "sessions.db", "open");
                store.close();
            }
            Err(e) => {
                report(false, "sessions.db", &e.to_string());
                healthy = false;
            }
        }
        match ctx.mail() {
            Ok(store) => {
                report(true, "mail.db", "open");
                store.close();
            }
            Err(e) => {
                report(false, "mail.db", &e.to_string());
                healthy = false;
            }
        }
        match ctx.events() {
            Ok(store) => {
                report(true, "events.db", "open");
                store.close();
            }
            Err(e) => {
                report(false, "events.db", &e.to_string());
                healthy = false;
            }
        }
    }

    if !healthy {
        anyhow::bail!("environment is not healthy");
    }
    println!("all checks passed");
    Ok(())
}

fn check_binary(name: &str, args: &[&str]) -> bool {
    match Command::new(name).args(args).output() {
        Ok(output) if output.status.success() => {
            report(true, name, "available");
            true
        }
        Ok(_) => {
            report(false, name, "errored");
            false
        }
        Err(_) => {
            report(false, name, "not found in PATH");
            false
        }
    }
}

fn report(ok: bool, what: &str, detail: &str) {
    println!("{} {:<12} {}", if ok { "ok " } else { "err" }, what, detail);
}
