// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{Run, RunStatus};
use crate::id::RunId;
use std::str::FromStr;

#[yare::parameterized(
    active    = { "active",    RunStatus::Active },
    completed = { "completed", RunStatus::Completed },
    failed    = { "failed",    RunStatus::Failed },
)]
fn status_roundtrip(name: &str, expected: RunStatus) {
    assert_eq!(RunStatus::from_str(name).unwrap(), expected);
    assert_eq!(expected.to_string(), name);
}

#[test]
fn run_serializes_to_json() {
    let run = Run {
        id: RunId::new("run-20260801-120000"),
        started_at: 1_754_000_000_000,
        completed_at: None,
        agent_count: 3,
        status: RunStatus::Active,
        coordinator_session: Some("overstory-proj-coordinator".into()),
    };
    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["id"], "run-20260801-120000");
    assert_eq!(json["status"], "active");
    assert_eq!(json["agent_count"], 3);
}
