// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup beacon: the first structured message a fresh agent receives.
//!
//! One logical line, three segments joined by an em-dash separator, sent
//! into the TUI once the ready marker shows up in pane output. The TUI can
//! drop input during late initialization, so the beacon is followed by two
//! delayed empty submissions.

use overstory_adapters::{SessionAdapter, SessionError};
use overstory_core::Capability;
use std::time::Duration;

/// Segment separator (em-dash with spaces).
const SEP: &str = " — ";

/// Compose the beacon text.
pub fn beacon_text(
    name: &str,
    capability: Capability,
    now_iso: &str,
    task_id: &str,
    depth: u32,
    parent: Option<&str>,
) -> String {
    let task = if task_id.is_empty() { "none" } else { task_id };
    format!(
        "[OVERSTORY] {name} ({capability}) {now_iso} task:{task}{SEP}\
         Depth: {depth} | Parent: {parent}{SEP}\
         Startup: read .claude/CLAUDE.md, run mulch prime, check mail \
         (overstory mail check --agent {name}), then begin task {task}",
        parent = parent.unwrap_or("none"),
    )
}

/// Poll pane output until `marker` appears, up to `attempts` captures
/// spaced `interval` apart. Returns whether the marker was seen.
pub async fn wait_for_tui_ready<S: SessionAdapter>(
    session: &S,
    tmux_name: &str,
    marker: &str,
    attempts: u32,
    interval: Duration,
) -> bool {
    for attempt in 0..attempts {
        match session.capture_output(tmux_name, 50).await {
            Ok(output) if output.contains(marker) => return true,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session = tmux_name, attempt, error = %e, "capture failed during ready poll");
            }
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// Send the beacon followed by two delayed empty submissions (~1s, ~2s).
pub async fn send_beacon<S: SessionAdapter>(
    session: &S,
    tmux_name: &str,
    text: &str,
) -> Result<(), SessionError> {
    session.send_literal(tmux_name, text).await?;
    session.send_enter(tmux_name).await?;

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    session.send_enter(tmux_name).await?;
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    session.send_enter(tmux_name).await?;
    Ok(())
}

#[cfg(test)]
#[path = "beacon_tests.rs"]
mod tests;
