// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External task tracker adapter.
//!
//! The tracker is consumed through its CLI (`bd` by default). The contract:
//! `<cmd> show <id> --json` prints a JSON object with at least `id` and
//! `status`; `<cmd> update <id> --status in_progress --assignee <agent>`
//! claims an issue. Anything else the tracker prints is ignored.

use crate::subprocess::{run_with_timeout, TRACKER_TIMEOUT};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;

/// Errors from tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker command failed: {0}")]
    CommandFailed(String),
    #[error("tracker output was not valid JSON: {0}")]
    BadOutput(String),
}

/// The slice of a tracker issue the orchestrator cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerIssue {
    pub id: String,
    pub status: String,
}

impl TrackerIssue {
    /// Statuses that accept new work.
    pub fn is_open(&self) -> bool {
        matches!(self.status.as_str(), "open" | "in_progress")
    }
}

/// Adapter over the external tracker CLI.
#[async_trait]
pub trait TrackerAdapter: Clone + Send + Sync + 'static {
    /// Fetch an issue; `None` when the tracker does not know the id.
    async fn get_issue(&self, id: &str) -> Result<Option<TrackerIssue>, TrackerError>;

    /// Claim an issue for an agent. Duplicate claims are the tracker's
    /// problem, not ours; callers treat failures as recoverable.
    async fn claim(&self, id: &str, agent: &str) -> Result<(), TrackerError>;
}

/// Tracker adapter shelling out to the configured CLI.
#[derive(Clone)]
pub struct BeadsTracker {
    cmd: String,
    cwd: PathBuf,
}

impl BeadsTracker {
    pub fn new(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: cwd.into(),
        }
    }
}

#[async_trait]
impl TrackerAdapter for BeadsTracker {
    async fn get_issue(&self, id: &str) -> Result<Option<TrackerIssue>, TrackerError> {
        let mut cmd = Command::new(&self.cmd);
        cmd.current_dir(&self.cwd).args(["show", id, "--json"]);
        let output = run_with_timeout(cmd, TRACKER_TIMEOUT, "tracker show")
            .await
            .map_err(TrackerError::CommandFailed)?;

        if !output.status.success() {
            // unknown ids come back as a non-zero exit, not a hard failure
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let value: serde_json::Value = serde_json::from_str(text.trim())
            .map_err(|e| TrackerError::BadOutput(e.to_string()))?;
        let issue_id = value
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or(id)
            .to_string();
        let status = value
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TrackerError::BadOutput("missing status field".into()))?
            .to_string();
        Ok(Some(TrackerIssue {
            id: issue_id,
            status,
        }))
    }

    async fn claim(&self, id: &str, agent: &str) -> Result<(), TrackerError> {
        let mut cmd = Command::new(&self.cmd);
        cmd.current_dir(&self.cwd)
            .args(["update", id, "--status", "in_progress", "--assignee", agent]);
        let output = run_with_timeout(cmd, TRACKER_TIMEOUT, "tracker update")
            .await
            .map_err(TrackerError::CommandFailed)?;
        if !output.status.success() {
            return Err(TrackerError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{TrackerAdapter, TrackerError, TrackerIssue};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// In-memory tracker fake.
    #[derive(Clone, Default)]
    pub struct FakeTracker {
        inner: Arc<Mutex<FakeTrackerState>>,
    }

    #[derive(Default)]
    struct FakeTrackerState {
        issues: HashMap<String, TrackerIssue>,
        claims: Vec<(String, String)>,
        fail_claims: bool,
    }

    impl FakeTracker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_issue(&self, id: &str, status: &str) {
            self.inner.lock().issues.insert(
                id.to_string(),
                TrackerIssue {
                    id: id.to_string(),
                    status: status.to_string(),
                },
            );
        }

        pub fn claims(&self) -> Vec<(String, String)> {
            self.inner.lock().claims.clone()
        }

        pub fn fail_claims(&self) {
            self.inner.lock().fail_claims = true;
        }
    }

    #[async_trait]
    impl TrackerAdapter for FakeTracker {
        async fn get_issue(&self, id: &str) -> Result<Option<TrackerIssue>, TrackerError> {
            Ok(self.inner.lock().issues.get(id).cloned())
        }

        async fn claim(&self, id: &str, agent: &str) -> Result<(), TrackerError> {
            let mut state = self.inner.lock();
            if state.fail_claims {
                return Err(TrackerError::CommandFailed("scripted claim failure".into()));
            }
            state.claims.push((id.to_string(), agent.to_string()));
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTracker;

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
