// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run records: one orchestration wave of agents.

use crate::id::RunId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown run status: {0}")]
pub struct RunStatusParseError(pub String);

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Active => "active",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = RunStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(RunStatus::Active),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(RunStatusParseError(other.to_string())),
        }
    }
}

/// A grouping of agents spawned during one orchestration wave.
///
/// Runs are never deleted; a completed run is history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    /// Epoch ms when the first session of the wave was spawned.
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub agent_count: u32,
    pub status: RunStatus,
    /// Tmux session of the coordinator driving this run, when one exists.
    pub coordinator_session: Option<String>,
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
