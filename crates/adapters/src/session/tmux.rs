// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux session adapter

use super::{SessionAdapter, SessionError};
use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Tmux-based session adapter
#[derive(Clone, Default)]
pub struct TmuxAdapter;

impl TmuxAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionAdapter for TmuxAdapter {
    async fn preflight(&self) -> Result<(), SessionError> {
        let mut cmd = Command::new("tmux");
        cmd.arg("-V");
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux -V")
            .await
            .map_err(SessionError::BinaryUnavailable)?;
        if !output.status.success() {
            return Err(SessionError::BinaryUnavailable(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }
        Ok(())
    }

    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), SessionError> {
        // Precondition: cwd must exist
        if !cwd.exists() {
            return Err(SessionError::SpawnFailed(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }

        let mut tmux_cmd = Command::new("tmux");
        tmux_cmd
            .arg("new-session")
            .arg("-d")
            .arg("-s")
            .arg(name)
            .arg("-c")
            .arg(cwd);

        for (key, value) in env {
            tmux_cmd.arg("-e").arg(format!("{}={}", key, value));
        }

        tmux_cmd.arg(cmd);

        let output = run_with_timeout(tmux_cmd, TMUX_TIMEOUT, "tmux new-session")
            .await
            .map_err(SessionError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(session = name, stderr = %stderr, "tmux spawn failed");
            return Err(SessionError::SpawnFailed(stderr.to_string()));
        }

        // Log stderr even on success - may contain useful warnings
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(session = name, stderr = %stderr, "tmux spawn stderr (non-fatal)");
        }

        Ok(())
    }

    async fn send_literal(&self, name: &str, text: &str) -> Result<(), SessionError> {
        // -l = literal mode (no key name interpretation)
        // -- = end of options (handles text starting with -)
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", name, "-l", "--", text]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux send-keys")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            return Err(SessionError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn send_enter(&self, name: &str) -> Result<(), SessionError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", name, "Enter"]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux send-keys Enter")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            return Err(SessionError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn kill(&self, name: &str) -> Result<(), SessionError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["kill-session", "-t", name]);
        let _ = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux kill-session")
            .await
            .map_err(SessionError::CommandFailed)?;
        // Session might already be dead, which is fine
        Ok(())
    }

    async fn is_alive(&self, name: &str) -> Result<bool, SessionError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["has-session", "-t", name]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux has-session")
            .await
            .map_err(SessionError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn capture_output(&self, name: &str, lines: u32) -> Result<String, SessionError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["capture-pane", "-t", name, "-p", "-S"])
            .arg(format!("-{}", lines));
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux capture-pane")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            return Err(SessionError::NotFound(name.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn pane_pid(&self, name: &str) -> Result<Option<u32>, SessionError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["list-panes", "-t", name, "-F", "#{pane_pid}"]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux list-panes")
            .await
            .map_err(SessionError::CommandFailed)?;

        if !output.status.success() {
            return Ok(None);
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.lines().next().and_then(|l| l.trim().parse().ok()))
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
