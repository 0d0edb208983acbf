// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{Identity, TaskRecord, RECENT_TASKS_CAP};
use crate::capability::Capability;

fn task(n: usize) -> TaskRecord {
    TaskRecord {
        task_id: format!("proj-{n:04}"),
        summary: format!("task {n}"),
        completed_at: "2026-08-01T12:00:00Z".into(),
    }
}

#[test]
fn record_completion_bumps_counter_and_merges_domains() {
    let mut id = Identity::new("builder-1", Capability::Builder, "2026-08-01T00:00:00Z");
    id.record_completion(task(1), &["storage".into(), "cli".into()]);
    id.record_completion(task(2), &["cli".into(), "tmux".into()]);

    assert_eq!(id.sessions_completed, 2);
    // ordered set: first occurrence wins, no duplicates
    assert_eq!(id.expertise_domains, vec!["storage", "cli", "tmux"]);
    assert_eq!(id.recent_tasks.len(), 2);
}

#[test]
fn recent_tasks_ring_is_bounded() {
    let mut id = Identity::new("builder-1", Capability::Builder, "2026-08-01T00:00:00Z");
    for n in 0..RECENT_TASKS_CAP + 5 {
        id.record_completion(task(n), &[]);
    }
    assert_eq!(id.recent_tasks.len(), RECENT_TASKS_CAP);
    // oldest entries dropped
    assert_eq!(id.recent_tasks[0].task_id, "proj-0005");
    assert_eq!(
        id.recent_tasks[RECENT_TASKS_CAP - 1].task_id,
        format!("proj-{:04}", RECENT_TASKS_CAP + 4)
    );
}

#[test]
fn identity_yaml_roundtrip_is_identity() {
    let mut id = Identity::new("scout-2", Capability::Scout, "2026-08-01T00:00:00Z");
    id.record_completion(
        TaskRecord {
            task_id: "proj-abc1".into(),
            summary: "mapped the storage layer: tables, indexes".into(),
            completed_at: "2026-08-01T09:30:00Z".into(),
        },
        &["storage".into()],
    );

    let yaml = serde_yaml::to_string(&id).unwrap();
    // exact top-level key names are part of the on-disk contract
    for key in [
        "name:",
        "capability:",
        "created:",
        "sessionsCompleted:",
        "expertiseDomains:",
        "recentTasks:",
    ] {
        assert!(yaml.contains(key), "missing {key} in:\n{yaml}");
    }

    let back: Identity = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, id);
}

#[test]
fn empty_sequences_serialize_and_parse() {
    let id = Identity::new("lead-1", Capability::Lead, "2026-08-01T00:00:00Z");
    let yaml = serde_yaml::to_string(&id).unwrap();
    let back: Identity = serde_yaml::from_str(&yaml).unwrap();
    assert!(back.expertise_domains.is_empty());
    assert!(back.recent_tasks.is_empty());
}
