// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    open        = { "open",        true },
    in_progress = { "in_progress", true },
    closed      = { "closed",      false },
    blocked     = { "blocked",     false },
)]
fn issue_openness(status: &str, expected: bool) {
    let issue = TrackerIssue {
        id: "proj-abc1".into(),
        status: status.into(),
    };
    assert_eq!(issue.is_open(), expected);
}

#[tokio::test]
async fn fake_tracker_records_claims() {
    let tracker = FakeTracker::new();
    tracker.add_issue("proj-abc1", "open");

    let issue = tracker.get_issue("proj-abc1").await.unwrap().unwrap();
    assert!(issue.is_open());
    assert!(tracker.get_issue("proj-none").await.unwrap().is_none());

    tracker.claim("proj-abc1", "builder-1").await.unwrap();
    assert_eq!(
        tracker.claims(),
        vec![("proj-abc1".to_string(), "builder-1".to_string())]
    );
}

#[tokio::test]
async fn fake_tracker_claim_failures_are_scriptable() {
    let tracker = FakeTracker::new();
    tracker.fail_claims();
    assert!(tracker.claim("proj-abc1", "builder-1").await.is_err());
}
