// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event log record types.
//!
//! Events are append-only: hook-invoked CLI calls insert them, inspection
//! commands read them. A row is immutable after insert.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hook-observable event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ToolStart,
    ToolEnd,
    SessionStart,
    SessionEnd,
    MailSent,
    MailReceived,
    Spawn,
    Error,
    Custom,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event type: {0}")]
pub struct EventTypeParseError(pub String);

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ToolStart => "tool_start",
            EventType::ToolEnd => "tool_end",
            EventType::SessionStart => "session_start",
            EventType::SessionEnd => "session_end",
            EventType::MailSent => "mail_sent",
            EventType::MailReceived => "mail_received",
            EventType::Spawn => "spawn",
            EventType::Error => "error",
            EventType::Custom => "custom",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = EventTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool_start" => Ok(EventType::ToolStart),
            "tool_end" => Ok(EventType::ToolEnd),
            "session_start" => Ok(EventType::SessionStart),
            "session_end" => Ok(EventType::SessionEnd),
            "mail_sent" => Ok(EventType::MailSent),
            "mail_received" => Ok(EventType::MailReceived),
            "spawn" => Ok(EventType::Spawn),
            "error" => Ok(EventType::Error),
            "custom" => Ok(EventType::Custom),
            other => Err(EventTypeParseError(other.to_string())),
        }
    }
}

/// Severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event level: {0}")]
pub struct EventLevelParseError(pub String);

impl EventLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Info => "info",
            EventLevel::Warn => "warn",
            EventLevel::Error => "error",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventLevel {
    type Err = EventLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(EventLevel::Info),
            "warn" => Ok(EventLevel::Warn),
            "error" => Ok(EventLevel::Error),
            other => Err(EventLevelParseError(other.to_string())),
        }
    }
}

/// A stored event row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub id: i64,
    pub run_id: Option<String>,
    pub agent_name: String,
    pub session_id: Option<String>,
    pub event_type: EventType,
    pub tool_name: Option<String>,
    /// Opaque tool arguments (JSON text from the hook).
    pub tool_args: Option<String>,
    pub duration_ms: Option<i64>,
    pub level: EventLevel,
    pub data: Option<String>,
    pub created_at: i64,
}

/// Fields supplied by the caller; id and created_at are assigned on insert.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub run_id: Option<String>,
    pub agent_name: String,
    pub session_id: Option<String>,
    pub event_type: Option<EventType>,
    pub tool_name: Option<String>,
    pub tool_args: Option<String>,
    pub duration_ms: Option<i64>,
    pub level: Option<EventLevel>,
    pub data: Option<String>,
}

/// Aggregated per-tool statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolStat {
    pub tool_name: String,
    pub count: i64,
    pub avg_duration_ms: Option<f64>,
    pub max_duration_ms: Option<i64>,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
