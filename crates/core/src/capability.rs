// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent capability roles.
//!
//! Capability is a closed set; every branch over it must be exhaustive so a
//! new role cannot slip past a policy decision unnoticed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The role an agent plays in a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Implements code inside its worktree
    Builder,
    /// Investigates and reports; never writes files
    Scout,
    /// Reviews diffs and leaves verdicts
    Reviewer,
    /// Plans work and spawns children
    Lead,
    /// Integrates finished branches
    Merger,
    /// Routes work across a run; no task of its own
    Coordinator,
    /// Supervises a subtree of agents
    Supervisor,
    /// Patrols fleet health; no task of its own
    Monitor,
}

/// Error parsing a capability name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown capability: {0} (valid: {valid})", valid = Capability::names().join(", "))]
pub struct CapabilityParseError(pub String);

impl Capability {
    /// Every capability, in display order.
    pub const ALL: [Capability; 8] = [
        Capability::Builder,
        Capability::Scout,
        Capability::Reviewer,
        Capability::Lead,
        Capability::Merger,
        Capability::Coordinator,
        Capability::Supervisor,
        Capability::Monitor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Builder => "builder",
            Capability::Scout => "scout",
            Capability::Reviewer => "reviewer",
            Capability::Lead => "lead",
            Capability::Merger => "merger",
            Capability::Coordinator => "coordinator",
            Capability::Supervisor => "supervisor",
            Capability::Monitor => "monitor",
        }
    }

    /// Lowercase names of every capability (for error messages).
    pub fn names() -> Vec<&'static str> {
        Capability::ALL.iter().map(|c| c.as_str()).collect()
    }

    /// Whether agents of this capability may use file-writing tools
    /// (Write/Edit/NotebookEdit) and file-modifying shell commands.
    pub fn can_write_files(&self) -> bool {
        matches!(self, Capability::Builder | Capability::Merger)
    }

    /// Coordination capabilities get `git add`/`git commit` whitelisted so
    /// they can sync tracker files from the repo root.
    pub fn is_coordination(&self) -> bool {
        matches!(
            self,
            Capability::Lead | Capability::Coordinator | Capability::Supervisor
        )
    }

    /// Whether a spawn of this capability must carry a tracker task id.
    /// Coordinators and monitors patrol without an assignment.
    pub fn requires_task(&self) -> bool {
        !matches!(self, Capability::Coordinator | Capability::Monitor)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = CapabilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "builder" => Ok(Capability::Builder),
            "scout" => Ok(Capability::Scout),
            "reviewer" => Ok(Capability::Reviewer),
            "lead" => Ok(Capability::Lead),
            "merger" => Ok(Capability::Merger),
            "coordinator" => Ok(Capability::Coordinator),
            "supervisor" => Ok(Capability::Supervisor),
            "monitor" => Ok(Capability::Monitor),
            other => Err(CapabilityParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
