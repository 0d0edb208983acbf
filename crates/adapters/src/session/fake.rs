// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake session adapter for testing

use super::{SessionAdapter, SessionError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded session call
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Preflight,
    Spawn {
        name: String,
        cwd: PathBuf,
        cmd: String,
        env: Vec<(String, String)>,
    },
    SendLiteral {
        name: String,
        text: String,
    },
    SendEnter {
        name: String,
    },
    Kill {
        name: String,
    },
    IsAlive {
        name: String,
    },
    CaptureOutput {
        name: String,
        lines: u32,
    },
    PanePid {
        name: String,
    },
}

/// Fake session state
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub cwd: PathBuf,
    pub cmd: String,
    pub env: Vec<(String, String)>,
    pub output: String,
    pub alive: bool,
    pub pid: Option<u32>,
}

#[derive(Default)]
struct FakeState {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<SessionCall>,
    preflight_error: Option<String>,
}

/// Fake session adapter for testing
#[derive(Clone, Default)]
pub struct FakeSessionAdapter {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.lock().calls.clone()
    }

    /// Get a session by name
    pub fn get_session(&self, name: &str) -> Option<FakeSession> {
        self.inner.lock().sessions.get(name).cloned()
    }

    /// Pre-register a session as alive (for watchdog tests).
    pub fn register(&self, name: &str, alive: bool) {
        self.inner.lock().sessions.insert(
            name.to_string(),
            FakeSession {
                cwd: PathBuf::new(),
                cmd: String::new(),
                env: Vec::new(),
                output: String::new(),
                alive,
                pid: Some(4242),
            },
        );
    }

    /// Set the pane output returned by `capture_output`.
    pub fn set_output(&self, name: &str, output: &str) {
        if let Some(session) = self.inner.lock().sessions.get_mut(name) {
            session.output = output.to_string();
        }
    }

    /// Mark a session dead.
    pub fn set_dead(&self, name: &str) {
        if let Some(session) = self.inner.lock().sessions.get_mut(name) {
            session.alive = false;
            session.pid = None;
        }
    }

    /// Make `preflight` fail with this message.
    pub fn fail_preflight(&self, message: &str) {
        self.inner.lock().preflight_error = Some(message.to_string());
    }

    /// Texts delivered via `send_literal`, in order, for one session.
    pub fn sent_texts(&self, name: &str) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                SessionCall::SendLiteral { name: n, text } if n == name => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn preflight(&self) -> Result<(), SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::Preflight);
        match &state.preflight_error {
            Some(msg) => Err(SessionError::BinaryUnavailable(msg.clone())),
            None => Ok(()),
        }
    }

    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::Spawn {
            name: name.to_string(),
            cwd: cwd.to_path_buf(),
            cmd: cmd.to_string(),
            env: env.to_vec(),
        });
        state.sessions.insert(
            name.to_string(),
            FakeSession {
                cwd: cwd.to_path_buf(),
                cmd: cmd.to_string(),
                env: env.to_vec(),
                output: String::new(),
                alive: true,
                pid: Some(4242),
            },
        );
        Ok(())
    }

    async fn send_literal(&self, name: &str, text: &str) -> Result<(), SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::SendLiteral {
            name: name.to_string(),
            text: text.to_string(),
        });
        if !state.sessions.contains_key(name) {
            return Err(SessionError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn send_enter(&self, name: &str) -> Result<(), SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::SendEnter {
            name: name.to_string(),
        });
        if !state.sessions.contains_key(name) {
            return Err(SessionError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn kill(&self, name: &str) -> Result<(), SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::Kill {
            name: name.to_string(),
        });
        if let Some(session) = state.sessions.get_mut(name) {
            session.alive = false;
            session.pid = None;
        }
        Ok(())
    }

    async fn is_alive(&self, name: &str) -> Result<bool, SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::IsAlive {
            name: name.to_string(),
        });
        Ok(state.sessions.get(name).map(|s| s.alive).unwrap_or(false))
    }

    async fn capture_output(&self, name: &str, lines: u32) -> Result<String, SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::CaptureOutput {
            name: name.to_string(),
            lines,
        });
        state
            .sessions
            .get(name)
            .map(|s| s.output.clone())
            .ok_or_else(|| SessionError::NotFound(name.to_string()))
    }

    async fn pane_pid(&self, name: &str) -> Result<Option<u32>, SessionError> {
        let mut state = self.inner.lock();
        state.calls.push(SessionCall::PanePid {
            name: name.to_string(),
        });
        Ok(state.sessions.get(name).and_then(|s| s.pid))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
