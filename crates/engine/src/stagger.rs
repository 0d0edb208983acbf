// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawn staggering.
//!
//! Parallel agent boots hammer the tracker, git, and the LLM backend at the
//! same instant. The spawn pipeline spaces session starts by
//! `stagger_delay_ms`, measured from the most recently started non-terminal
//! session.

use overstory_core::AgentSession;

/// Remaining milliseconds to sleep before creating the next session.
///
/// Zero when the configured delay is zero, when there are no active
/// sessions, or when the most recent start is already older than the delay.
pub fn calculate_stagger_delay(delay_ms: u64, active: &[AgentSession], now_ms: i64) -> u64 {
    if delay_ms == 0 || active.is_empty() {
        return 0;
    }
    let most_recent = active.iter().map(|s| s.created_at).max().unwrap_or(0);
    let elapsed = now_ms.saturating_sub(most_recent).max(0) as u64;
    delay_ms.saturating_sub(elapsed)
}

#[cfg(test)]
#[path = "stagger_tests.rs"]
mod tests;
