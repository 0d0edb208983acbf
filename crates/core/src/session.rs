// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent session records and lifecycle states.
//!
//! A session is one row in the session store: the authoritative record of a
//! live (or retired) agent. The agent name is the unique key; the opaque row
//! id exists so a name can be re-used after the prior session reaches a
//! terminal state.

use crate::capability::Capability;
use crate::id::RunId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of an agent session.
///
/// Transitions: booting → working on first hook-observed activity;
/// working ⇄ stalled on activity thresholds; any → zombie when the tmux
/// session is dead past the zombie threshold; any → completed on explicit
/// stop or graceful exit. `completed` and `zombie` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Booting,
    Working,
    Stalled,
    Completed,
    Zombie,
}

/// Error parsing an agent state name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown agent state: {0}")]
pub struct StateParseError(pub String);

impl AgentState {
    pub const ALL: [AgentState; 5] = [
        AgentState::Booting,
        AgentState::Working,
        AgentState::Stalled,
        AgentState::Completed,
        AgentState::Zombie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Booting => "booting",
            AgentState::Working => "working",
            AgentState::Stalled => "stalled",
            AgentState::Completed => "completed",
            AgentState::Zombie => "zombie",
        }
    }

    /// Terminal states free the agent name for re-use.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Completed | AgentState::Zombie)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentState {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "booting" => Ok(AgentState::Booting),
            "working" => Ok(AgentState::Working),
            "stalled" => Ok(AgentState::Stalled),
            "completed" => Ok(AgentState::Completed),
            "zombie" => Ok(AgentState::Zombie),
            other => Err(StateParseError(other.to_string())),
        }
    }
}

/// One row in the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSession {
    /// Opaque row id (uuid). The agent name is the unique business key.
    pub id: String,
    pub name: String,
    pub capability: Capability,
    pub state: AgentState,
    /// Tracker task id; empty for coordinator/monitor sessions.
    pub task_id: String,
    /// Branch owned by this session (`overstory/{name}/{task}`).
    pub branch: String,
    pub worktree_path: PathBuf,
    /// Supervising tmux session name.
    pub tmux_session: String,
    /// Pane pid when known.
    pub pid: Option<u32>,
    pub run_id: Option<RunId>,
    pub parent_agent: Option<String>,
    pub depth: u32,
    /// Epoch ms of the last hook-observed activity.
    pub last_activity: i64,
    /// Consecutive nudges without observed activity.
    pub escalation_level: u32,
    /// Epoch ms when the watchdog first marked this session stalled.
    pub stalled_since: Option<i64>,
    pub created_at: i64,
}

impl AgentSession {
    /// Whether this session still counts against concurrency limits.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }
}

/// Criteria for bulk removal of session rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeFilter {
    All,
    State(AgentState),
    Agent(String),
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
