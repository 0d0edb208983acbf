// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent identity records.
//!
//! An identity survives across sessions under the same agent name. It lives
//! at `.overstory/agents/<name>/identity.yaml` with camelCase keys so that
//! agents (and humans) can read it without going through the CLI.

use crate::capability::Capability;
use serde::{Deserialize, Serialize};

/// Bound on the recent-task ring.
pub const RECENT_TASKS_CAP: usize = 20;

/// One completed task in the identity's history ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: String,
    pub summary: String,
    /// ISO-8601 UTC timestamp.
    pub completed_at: String,
}

/// Persistent record of who an agent name has been.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub name: String,
    pub capability: Capability,
    /// ISO-8601 UTC timestamp of first creation.
    pub created: String,
    pub sessions_completed: u32,
    #[serde(default)]
    pub expertise_domains: Vec<String>,
    #[serde(default)]
    pub recent_tasks: Vec<TaskRecord>,
}

impl Identity {
    pub fn new(name: impl Into<String>, capability: Capability, created: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability,
            created: created.into(),
            sessions_completed: 0,
            expertise_domains: Vec::new(),
            recent_tasks: Vec::new(),
        }
    }

    /// Record a completed session: bump the counter, merge new expertise
    /// domains (ordered-set semantics, first occurrence wins), and push the
    /// task onto the ring, dropping the oldest past [`RECENT_TASKS_CAP`].
    pub fn record_completion(&mut self, task: TaskRecord, domains: &[String]) {
        self.sessions_completed += 1;
        for domain in domains {
            if !self.expertise_domains.iter().any(|d| d == domain) {
                self.expertise_domains.push(domain.clone());
            }
        }
        self.recent_tasks.push(task);
        if self.recent_tasks.len() > RECENT_TASKS_CAP {
            let excess = self.recent_tasks.len() - RECENT_TASKS_CAP;
            self.recent_tasks.drain(..excess);
        }
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
