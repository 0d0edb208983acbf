// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory status` - Fleet overview

use crate::context::ProjectContext;
use anyhow::Result;
use overstory_core::format_elapsed_ms;

pub async fn status(json: bool) -> Result<()> {
    let ctx = ProjectContext::discover()?;
    let sessions = ctx.sessions()?;

    let active = sessions.get_active()?;
    let run = sessions.get_active_run()?;
    let now_ms = ctx.now_ms();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "run": run,
                "active": active,
            }))?
        );
        return Ok(());
    }

    match &run {
        Some(run) => println!(
            "run {} ({} agents, started {} ago)",
            run.id,
            run.agent_count,
            format_elapsed_ms(now_ms.saturating_sub(run.started_at).max(0) as u64)
        ),
        None => println!("no active run"),
    }

    if active.is_empty() {
        println!("no active agents");
        return Ok(());
    }

    println!(
        "{:<16} {:<12} {:<10} {:<14} {:>9} {:>5}",
        "AGENT", "CAPABILITY", "STATE", "TASK", "IDLE", "ESC"
    );
    for session in &active {
        let idle = now_ms.saturating_sub(session.last_activity).max(0) as u64;
        println!(
            "{:<16} {:<12} {:<10} {:<14} {:>9} {:>5}",
            session.name,
            session.capability.to_string(),
            session.state.to_string(),
            if session.task_id.is_empty() {
                "-"
            } else {
                &session.task_id
            },
            format_elapsed_ms(idle),
            session.escalation_level,
        );
    }

    sessions.close();
    Ok(())
}
