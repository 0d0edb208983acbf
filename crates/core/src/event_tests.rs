// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{EventLevel, EventType};
use std::str::FromStr;

#[yare::parameterized(
    tool_start    = { "tool_start",    EventType::ToolStart },
    tool_end      = { "tool_end",      EventType::ToolEnd },
    session_start = { "session_start", EventType::SessionStart },
    session_end   = { "session_end",   EventType::SessionEnd },
    mail_sent     = { "mail_sent",     EventType::MailSent },
    mail_received = { "mail_received", EventType::MailReceived },
    spawn         = { "spawn",         EventType::Spawn },
    error         = { "error",         EventType::Error },
    custom        = { "custom",        EventType::Custom },
)]
fn event_type_roundtrip(name: &str, expected: EventType) {
    assert_eq!(EventType::from_str(name).unwrap(), expected);
    assert_eq!(expected.to_string(), name);
}

#[test]
fn event_level_roundtrip() {
    for level in [EventLevel::Info, EventLevel::Warn, EventLevel::Error] {
        assert_eq!(EventLevel::from_str(level.as_str()).unwrap(), level);
    }
    assert!(EventLevel::from_str("fatal").is_err());
}
