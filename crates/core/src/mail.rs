// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail message types.
//!
//! Plain types carry free-form bodies; protocol types additionally carry a
//! structured payload serialized into the message's `payload` column. The
//! payload is a tagged enum so each protocol type owns its payload shape.

use crate::capability::Capability;
use crate::session::AgentState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Message type. The first four are free-form; the rest are protocol types
/// with a structured payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Status,
    Question,
    Result,
    Error,
    WorkerDone,
    MergeReady,
    Merged,
    MergeFailed,
    Escalation,
    HealthCheck,
    Dispatch,
    Assign,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown message type: {0}")]
pub struct MessageTypeParseError(pub String);

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Status => "status",
            MessageType::Question => "question",
            MessageType::Result => "result",
            MessageType::Error => "error",
            MessageType::WorkerDone => "worker_done",
            MessageType::MergeReady => "merge_ready",
            MessageType::Merged => "merged",
            MessageType::MergeFailed => "merge_failed",
            MessageType::Escalation => "escalation",
            MessageType::HealthCheck => "health_check",
            MessageType::Dispatch => "dispatch",
            MessageType::Assign => "assign",
        }
    }

    /// Protocol types carry a structured payload.
    pub fn is_protocol(&self) -> bool {
        !matches!(
            self,
            MessageType::Status | MessageType::Question | MessageType::Result | MessageType::Error
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = MessageTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" => Ok(MessageType::Status),
            "question" => Ok(MessageType::Question),
            "result" => Ok(MessageType::Result),
            "error" => Ok(MessageType::Error),
            "worker_done" => Ok(MessageType::WorkerDone),
            "merge_ready" => Ok(MessageType::MergeReady),
            "merged" => Ok(MessageType::Merged),
            "merge_failed" => Ok(MessageType::MergeFailed),
            "escalation" => Ok(MessageType::Escalation),
            "health_check" => Ok(MessageType::HealthCheck),
            "dispatch" => Ok(MessageType::Dispatch),
            "assign" => Ok(MessageType::Assign),
            other => Err(MessageTypeParseError(other.to_string())),
        }
    }
}

/// Delivery priority. Non-normal priorities are surfaced in the hook
/// injection header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct PriorityParseError(pub String);

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(PriorityParseError(other.to_string())),
        }
    }
}

/// One persistent mail message.
///
/// `read` is monotonic: false → true only. `thread_id` equals the root
/// message id for replies, or is carried explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub message_type: MessageType,
    pub priority: Priority,
    pub thread_id: Option<String>,
    /// Serialized [`ProtocolPayload`] for protocol types; opaque otherwise.
    pub payload: Option<String>,
    pub read: bool,
    pub created_at: i64,
}

/// Structured payloads, one variant per protocol message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolPayload {
    WorkerDone {
        agent: String,
        task_id: String,
        branch: String,
        summary: String,
    },
    MergeReady {
        agent: String,
        task_id: String,
        branch: String,
    },
    Merged {
        branch: String,
        target: String,
    },
    MergeFailed {
        branch: String,
        reason: String,
    },
    Escalation {
        agent: String,
        reason: String,
        level: u32,
    },
    HealthCheck {
        agent: String,
        state: AgentState,
        tmux_alive: bool,
        note: Option<String>,
    },
    Dispatch {
        task_id: String,
        capability: Capability,
    },
    Assign {
        task_id: String,
        agent: String,
    },
}

impl ProtocolPayload {
    /// The message type this payload shape belongs to.
    pub fn message_type(&self) -> MessageType {
        match self {
            ProtocolPayload::WorkerDone { .. } => MessageType::WorkerDone,
            ProtocolPayload::MergeReady { .. } => MessageType::MergeReady,
            ProtocolPayload::Merged { .. } => MessageType::Merged,
            ProtocolPayload::MergeFailed { .. } => MessageType::MergeFailed,
            ProtocolPayload::Escalation { .. } => MessageType::Escalation,
            ProtocolPayload::HealthCheck { .. } => MessageType::HealthCheck,
            ProtocolPayload::Dispatch { .. } => MessageType::Dispatch,
            ProtocolPayload::Assign { .. } => MessageType::Assign,
        }
    }
}

#[cfg(test)]
#[path = "mail_tests.rs"]
mod tests;
