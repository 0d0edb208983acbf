// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::calculate_stagger_delay;
use overstory_core::{AgentSession, AgentState, Capability};
use std::path::PathBuf;

fn session_started_at(created_at: i64) -> AgentSession {
    AgentSession {
        id: "id".into(),
        name: "a".into(),
        capability: Capability::Builder,
        state: AgentState::Working,
        task_id: "t".into(),
        branch: String::new(),
        worktree_path: PathBuf::new(),
        tmux_session: String::new(),
        pid: None,
        run_id: None,
        parent_agent: None,
        depth: 0,
        last_activity: created_at,
        escalation_level: 0,
        stalled_since: None,
        created_at,
    }
}

#[test]
fn zero_delay_never_sleeps() {
    let active = vec![session_started_at(1_000)];
    assert_eq!(calculate_stagger_delay(0, &active, 1_001), 0);
}

#[test]
fn no_active_sessions_never_sleeps() {
    assert_eq!(calculate_stagger_delay(2_000, &[], 1_000), 0);
}

#[test]
fn elapsed_past_delay_never_sleeps() {
    let active = vec![session_started_at(1_000)];
    assert_eq!(calculate_stagger_delay(2_000, &active, 3_000), 0);
    assert_eq!(calculate_stagger_delay(2_000, &active, 10_000), 0);
}

#[test]
fn partial_elapsed_sleeps_the_remainder() {
    let active = vec![session_started_at(1_000)];
    assert_eq!(calculate_stagger_delay(2_000, &active, 1_500), 1_500);
    assert_eq!(calculate_stagger_delay(2_000, &active, 1_000), 2_000);
}

#[test]
fn most_recent_session_wins() {
    let active = vec![
        session_started_at(1_000),
        session_started_at(5_000),
        session_started_at(3_000),
    ];
    // measured from 5_000, not 1_000
    assert_eq!(calculate_stagger_delay(2_000, &active, 6_000), 1_000);
}
