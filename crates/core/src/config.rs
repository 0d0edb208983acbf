// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator configuration.
//!
//! Loaded once per CLI invocation from `.overstory/config.yaml`. Every field
//! has a default so a bare `overstory init` produces a working setup.

use crate::capability::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Operator config, YAML with camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Maximum hierarchy depth a spawn may declare.
    pub max_depth: u32,
    /// Maximum non-terminal sessions across the project.
    pub max_concurrent: u32,
    /// Maximum sessions per run; 0 means unlimited.
    pub max_sessions_per_run: u32,
    /// Minimum spacing between session starts.
    pub stagger_delay_ms: u64,
    /// No activity for this long marks a session stalled.
    pub stale_threshold_ms: u64,
    /// Dead multiplexer past this long marks a session zombie.
    pub zombie_threshold_ms: u64,
    /// At most one nudge per stalled agent within this window.
    pub nudge_interval_ms: u64,
    /// Watchdog pass interval.
    pub poll_interval_ms: u64,
    /// Project name used in tmux session names; defaults to the repo
    /// directory name when unset.
    pub project_name: Option<String>,
    /// Branch worktrees are rooted at and merged back into.
    pub canonical_branch: String,
    /// External task tracker CLI.
    pub tracker_cmd: String,
    /// Domain-knowledge helper CLI.
    pub mulch_cmd: String,
    /// The supervised LLM binary launched inside each tmux session.
    pub agent_cmd: String,
    /// Substring observed in pane output once the agent TUI is ready.
    pub tui_ready_marker: String,
    /// Model selection per capability; absent capabilities use the agent
    /// binary's own default.
    pub models: BTreeMap<Capability, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_concurrent: 8,
            max_sessions_per_run: 0,
            stagger_delay_ms: 2_000,
            stale_threshold_ms: 120_000,
            zombie_threshold_ms: 300_000,
            nudge_interval_ms: 60_000,
            poll_interval_ms: 15_000,
            project_name: None,
            canonical_branch: "main".into(),
            tracker_cmd: "bd".into(),
            mulch_cmd: "mulch".into(),
            agent_cmd: "claude".into(),
            tui_ready_marker: "? for shortcuts".into(),
            models: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load from a YAML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Resolve the project name: configured value, else the root directory
    /// name, else `"project"`.
    pub fn project_name(&self, project_root: &Path) -> String {
        if let Some(name) = &self.project_name {
            return name.clone();
        }
        project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".into())
    }

    /// Model for a capability, when configured.
    pub fn model_for(&self, capability: Capability) -> Option<&str> {
        self.models.get(&capability).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
