// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ensure, load, record_completion, save};
use overstory_core::{Capability, OverstoryPaths, TaskRecord};

fn setup() -> (tempfile::TempDir, OverstoryPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = OverstoryPaths::at(dir.path());
    std::fs::create_dir_all(paths.meta_dir()).unwrap();
    (dir, paths)
}

#[test]
fn ensure_creates_once_and_then_loads() {
    let (_dir, paths) = setup();

    let created = ensure(&paths, "builder-1", Capability::Builder, "2026-08-01T00:00:00Z").unwrap();
    assert_eq!(created.sessions_completed, 0);
    assert!(paths.identity("builder-1").is_file());

    // a second ensure must not reset history
    record_completion(
        &paths,
        "builder-1",
        TaskRecord {
            task_id: "proj-abc1".into(),
            summary: "did the thing".into(),
            completed_at: "2026-08-01T01:00:00Z".into(),
        },
        &["storage".into()],
    )
    .unwrap();
    let again = ensure(&paths, "builder-1", Capability::Builder, "2026-08-02T00:00:00Z").unwrap();
    assert_eq!(again.sessions_completed, 1);
    assert_eq!(again.created, "2026-08-01T00:00:00Z");
}

#[test]
fn save_load_roundtrip_preserves_fields() {
    let (_dir, paths) = setup();
    let mut identity = ensure(&paths, "scout-1", Capability::Scout, "2026-08-01T00:00:00Z").unwrap();
    identity.record_completion(
        TaskRecord {
            task_id: "proj-x".into(),
            summary: "it's a report: with colons #and hashes".into(),
            completed_at: "2026-08-01T02:00:00Z".into(),
        },
        &["mail".into(), "events".into()],
    );
    save(&paths, &identity).unwrap();

    let loaded = load(&paths, "scout-1").unwrap().unwrap();
    assert_eq!(loaded, identity);
}

#[test]
fn recording_for_an_unknown_agent_is_a_noop() {
    let (_dir, paths) = setup();
    record_completion(
        &paths,
        "ghost",
        TaskRecord {
            task_id: "t".into(),
            summary: "s".into(),
            completed_at: "c".into(),
        },
        &[],
    )
    .unwrap();
    assert!(load(&paths, "ghost").unwrap().is_none());
}
