// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal multiplexer session adapters

mod tmux;

pub use tmux::TmuxAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeSessionAdapter, SessionCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("multiplexer binary unavailable: {0}")]
    BinaryUnavailable(String),
}

/// Adapter for supervising terminal sessions.
///
/// Session names are chosen by the caller (`overstory-{project}-{agent}`)
/// and are the id for every subsequent operation.
#[async_trait]
pub trait SessionAdapter: Clone + Send + Sync + 'static {
    /// Verify the multiplexer binary is available.
    async fn preflight(&self) -> Result<(), SessionError>;

    /// Create a detached session named `name`, running `cmd` in `cwd` with
    /// the given extra environment.
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), SessionError>;

    /// Send literal text to a session (no key-name interpretation).
    async fn send_literal(&self, name: &str, text: &str) -> Result<(), SessionError>;

    /// Send the Enter key to a session.
    async fn send_enter(&self, name: &str) -> Result<(), SessionError>;

    /// Kill a session. Killing a dead session is not an error.
    async fn kill(&self, name: &str) -> Result<(), SessionError>;

    /// Check whether a session is alive.
    async fn is_alive(&self, name: &str) -> Result<bool, SessionError>;

    /// Capture the last `lines` lines of pane output.
    async fn capture_output(&self, name: &str, lines: u32) -> Result<String, SessionError>;

    /// Pid of the session's pane process, when the session is alive.
    async fn pane_pid(&self, name: &str) -> Result<Option<u32>, SessionError>;
}
