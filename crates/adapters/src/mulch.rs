// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mulch adapter: best-effort domain-knowledge extraction.
//!
//! Mulch is an optional helper; every failure here is recoverable and the
//! spawn pipeline only loses the knowledge extract, never the spawn.

use crate::subprocess::{run_with_timeout, MULCH_TIMEOUT};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Adapter over the mulch CLI.
#[async_trait]
pub trait MulchAdapter: Clone + Send + Sync + 'static {
    /// Extract knowledge for the given domain tags. `None` when mulch is
    /// unavailable, errors, or has nothing to say.
    async fn extract(&self, domains: &[String]) -> Option<String>;
}

/// Mulch adapter shelling out to the configured CLI.
#[derive(Clone)]
pub struct CliMulch {
    cmd: String,
    cwd: PathBuf,
}

impl CliMulch {
    pub fn new(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: cwd.into(),
        }
    }
}

#[async_trait]
impl MulchAdapter for CliMulch {
    async fn extract(&self, domains: &[String]) -> Option<String> {
        if domains.is_empty() {
            return None;
        }
        let mut cmd = Command::new(&self.cmd);
        cmd.current_dir(&self.cwd).arg("extract");
        for domain in domains {
            cmd.arg(domain);
        }
        match run_with_timeout(cmd, MULCH_TIMEOUT, "mulch extract").await {
            Ok(output) if output.status.success() => {
                let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
            Ok(output) => {
                tracing::warn!(
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "mulch extract failed (non-fatal)"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "mulch unavailable (non-fatal)");
                None
            }
        }
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::MulchAdapter;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// In-memory mulch fake with a scripted extract.
    #[derive(Clone, Default)]
    pub struct FakeMulch {
        extract: Arc<Mutex<Option<String>>>,
    }

    impl FakeMulch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_extract(text: &str) -> Self {
            Self {
                extract: Arc::new(Mutex::new(Some(text.to_string()))),
            }
        }
    }

    #[async_trait]
    impl MulchAdapter for FakeMulch {
        async fn extract(&self, domains: &[String]) -> Option<String> {
            if domains.is_empty() {
                return None;
            }
            self.extract.lock().clone()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMulch;
