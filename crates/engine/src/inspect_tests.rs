// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::derive_current_file;
use overstory_core::{AgentEvent, EventLevel, EventType};

fn event(event_type: EventType, tool: Option<&str>, args: Option<&str>) -> AgentEvent {
    AgentEvent {
        id: 0,
        run_id: None,
        agent_name: "a".into(),
        session_id: None,
        event_type,
        tool_name: tool.map(str::to_string),
        tool_args: args.map(str::to_string),
        duration_ms: None,
        level: EventLevel::Info,
        data: None,
        created_at: 0,
    }
}

#[test]
fn most_recent_file_tool_wins() {
    let events = vec![
        event(
            EventType::ToolStart,
            Some("Edit"),
            Some(r#"{"file_path":"src/old.rs"}"#),
        ),
        event(EventType::ToolStart, Some("Bash"), Some(r#"{"command":"ls"}"#)),
        event(
            EventType::ToolStart,
            Some("Write"),
            Some(r#"{"file_path":"src/new.rs"}"#),
        ),
        event(EventType::ToolEnd, Some("Write"), None),
    ];
    assert_eq!(derive_current_file(&events).as_deref(), Some("src/new.rs"));
}

#[test]
fn non_file_tools_and_bad_json_are_skipped() {
    let events = vec![
        event(
            EventType::ToolStart,
            Some("Read"),
            Some(r#"{"path":"docs/spec.md"}"#),
        ),
        event(EventType::ToolStart, Some("Edit"), Some("not json")),
        event(EventType::ToolStart, Some("Grep"), Some(r#"{"pattern":"x"}"#)),
    ];
    assert_eq!(derive_current_file(&events).as_deref(), Some("docs/spec.md"));
}

#[test]
fn no_candidates_means_none() {
    assert_eq!(derive_current_file(&[]), None);
    let events = vec![event(EventType::MailSent, None, None)];
    assert_eq!(derive_current_file(&events), None);
}
