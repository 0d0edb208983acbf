// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error taxonomy.
//!
//! Every kind maps to a stable machine code surfaced by the CLI as
//! `Error [<code>]: …`. Agent errors always carry the agent name.

use overstory_adapters::{GitError, SessionError, TrackerError};
use overstory_store::{EventStoreError, MailStoreError, SessionStoreError};
use thiserror::Error;

/// Stable machine codes for the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Hierarchy,
    Agent,
    Worktree,
    Mail,
    Group,
    Tracker,
    Generic,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Validation => "validation",
            ErrorCode::Hierarchy => "hierarchy",
            ErrorCode::Agent => "agent",
            ErrorCode::Worktree => "worktree",
            ErrorCode::Mail => "mail",
            ErrorCode::Group => "group",
            ErrorCode::Tracker => "tracker",
            ErrorCode::Generic => "generic",
        }
    }
}

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller input violates a contract.
    #[error("{0}")]
    Validation(String),

    /// Spawn hierarchy rule violation.
    #[error("{0}")]
    Hierarchy(String),

    /// Failure in a spawn or lifecycle step; carries the agent name.
    #[error("agent {agent}: {message}")]
    Agent { agent: String, message: String },

    /// Git subprocess failure.
    #[error("{0}")]
    Worktree(#[from] GitError),

    /// Mail-store failure.
    #[error("{0}")]
    Mail(#[from] MailStoreError),

    /// Task-group operation failure.
    #[error("{0}")]
    Group(String),

    /// External tracker missing or misbehaving.
    #[error("{0}")]
    Tracker(#[from] TrackerError),

    /// Everything else.
    #[error("{0}")]
    Generic(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation(_) => ErrorCode::Validation,
            EngineError::Hierarchy(_) => ErrorCode::Hierarchy,
            EngineError::Agent { .. } => ErrorCode::Agent,
            EngineError::Worktree(_) => ErrorCode::Worktree,
            EngineError::Mail(_) => ErrorCode::Mail,
            EngineError::Group(_) => ErrorCode::Group,
            EngineError::Tracker(_) => ErrorCode::Tracker,
            EngineError::Generic(_) => ErrorCode::Generic,
        }
    }

    /// Attach an agent name to any error, preserving the message.
    pub fn for_agent(agent: &str, message: impl std::fmt::Display) -> Self {
        EngineError::Agent {
            agent: agent.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<SessionStoreError> for EngineError {
    fn from(e: SessionStoreError) -> Self {
        EngineError::Generic(e.to_string())
    }
}

impl From<EventStoreError> for EngineError {
    fn from(e: EventStoreError) -> Self {
        EngineError::Generic(e.to_string())
    }
}

impl From<SessionError> for EngineError {
    fn from(e: SessionError) -> Self {
        EngineError::Generic(e.to_string())
    }
}

impl From<overstory_core::ConfigError> for EngineError {
    fn from(e: overstory_core::ConfigError) -> Self {
        EngineError::Validation(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
