// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{EventQuery, EventStore};
use overstory_core::{EventLevel, EventType, NewEvent};

fn open_store() -> (tempfile::TempDir, EventStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = EventStore::open(&dir.path().join("events.db")).unwrap();
    (dir, store)
}

fn tool_end(agent: &str, tool: &str, duration_ms: i64) -> NewEvent {
    NewEvent {
        agent_name: agent.to_string(),
        event_type: Some(EventType::ToolEnd),
        tool_name: Some(tool.to_string()),
        duration_ms: Some(duration_ms),
        ..NewEvent::default()
    }
}

#[test]
fn append_assigns_monotonic_ids_and_defaults() {
    let (_dir, store) = open_store();
    let first = store
        .append(
            &NewEvent {
                agent_name: "builder-1".into(),
                ..NewEvent::default()
            },
            100,
        )
        .unwrap();
    let second = store.append(&tool_end("builder-1", "Edit", 12), 200).unwrap();
    assert!(second > first);

    let events = store
        .get_by_agent("builder-1", &EventQuery::default())
        .unwrap();
    assert_eq!(events.len(), 2);
    // defaults: custom type, info level
    assert_eq!(events[0].event_type, EventType::Custom);
    assert_eq!(events[0].level, EventLevel::Info);
    assert_eq!(events[1].event_type, EventType::ToolEnd);
}

#[test]
fn queries_are_chronological_and_windowed() {
    let (_dir, store) = open_store();
    for (n, ts) in [(1, 100), (2, 200), (3, 300), (4, 400)] {
        store
            .append(
                &NewEvent {
                    agent_name: "a".into(),
                    event_type: Some(EventType::ToolStart),
                    tool_name: Some(format!("T{n}")),
                    ..NewEvent::default()
                },
                ts,
            )
            .unwrap();
    }

    let all = store.get_by_agent("a", &EventQuery::default()).unwrap();
    let times: Vec<i64> = all.iter().map(|e| e.created_at).collect();
    assert_eq!(times, vec![100, 200, 300, 400]);

    let windowed = store
        .get_by_agent(
            "a",
            &EventQuery {
                since: Some(200),
                until: Some(300),
                limit: None,
            },
        )
        .unwrap();
    assert_eq!(windowed.len(), 2);

    // limit keeps the most recent rows, still oldest-first
    let limited = store
        .get_by_agent(
            "a",
            &EventQuery {
                limit: Some(2),
                ..EventQuery::default()
            },
        )
        .unwrap();
    let tools: Vec<&str> = limited
        .iter()
        .filter_map(|e| e.tool_name.as_deref())
        .collect();
    assert_eq!(tools, vec!["T3", "T4"]);
}

#[test]
fn run_and_timeline_queries_filter_correctly() {
    let (_dir, store) = open_store();
    store
        .append(
            &NewEvent {
                agent_name: "a".into(),
                run_id: Some("run-1".into()),
                event_type: Some(EventType::Spawn),
                ..NewEvent::default()
            },
            1,
        )
        .unwrap();
    store
        .append(
            &NewEvent {
                agent_name: "b".into(),
                run_id: Some("run-2".into()),
                event_type: Some(EventType::Spawn),
                ..NewEvent::default()
            },
            2,
        )
        .unwrap();

    assert_eq!(
        store
            .get_by_run("run-1", &EventQuery::default())
            .unwrap()
            .len(),
        1
    );
    assert_eq!(store.get_timeline(&EventQuery::default()).unwrap().len(), 2);
}

#[test]
fn tool_stats_aggregate_count_avg_max() {
    let (_dir, store) = open_store();
    store.append(&tool_end("a", "Edit", 10), 1).unwrap();
    store.append(&tool_end("a", "Edit", 30), 2).unwrap();
    store.append(&tool_end("a", "Read", 5), 3).unwrap();
    store.append(&tool_end("b", "Edit", 100), 4).unwrap();
    // tool_start rows don't count toward stats
    store
        .append(
            &NewEvent {
                agent_name: "a".into(),
                event_type: Some(EventType::ToolStart),
                tool_name: Some("Edit".into()),
                ..NewEvent::default()
            },
            5,
        )
        .unwrap();

    let stats = store.get_tool_stats(Some("a")).unwrap();
    assert_eq!(stats.len(), 2);
    let edit = stats.iter().find(|s| s.tool_name == "Edit").unwrap();
    assert_eq!(edit.count, 2);
    assert_eq!(edit.avg_duration_ms, Some(20.0));
    assert_eq!(edit.max_duration_ms, Some(30));

    let global = store.get_tool_stats(None).unwrap();
    let edit = global.iter().find(|s| s.tool_name == "Edit").unwrap();
    assert_eq!(edit.count, 3);
}
