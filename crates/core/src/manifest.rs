// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent manifest: the catalogue of capability definitions.
//!
//! `.overstory/manifest.yaml` maps each capability to its base agent
//! definition text, optional model override, extra environment, and whether
//! it may spawn children. A missing file yields the built-in manifest so
//! `sling` works immediately after `init`.

use crate::capability::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors loading the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Definition of one capability in the manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapabilitySpec {
    /// Model override; falls back to config `models`, then the binary default.
    pub model: Option<String>,
    /// Base agent definition text injected into the overlay document.
    pub definition: String,
    /// Extra environment for the tmux session.
    pub env: BTreeMap<String, String>,
    /// Whether agents of this capability may request child spawns.
    pub can_spawn: bool,
}

/// The loaded manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub capabilities: BTreeMap<Capability, CapabilitySpec>,
}

impl Default for Manifest {
    fn default() -> Self {
        let spec = |definition: &str, can_spawn: bool| CapabilitySpec {
            model: None,
            definition: definition.into(),
            env: BTreeMap::new(),
            can_spawn,
        };
        let mut capabilities = BTreeMap::new();
        capabilities.insert(
            Capability::Builder,
            spec(
                "You implement the assigned task inside your worktree. \
                 Commit early, report via mail when done.",
                false,
            ),
        );
        capabilities.insert(
            Capability::Scout,
            spec(
                "You investigate and report. You never modify files; \
                 your deliverable is a mail message.",
                false,
            ),
        );
        capabilities.insert(
            Capability::Reviewer,
            spec(
                "You review the branch you are pointed at and reply with \
                 findings. You never modify files.",
                false,
            ),
        );
        capabilities.insert(
            Capability::Lead,
            spec(
                "You break the task down, file tracker records under .seeds/, \
                 and spawn scouts and builders for the pieces.",
                true,
            ),
        );
        capabilities.insert(
            Capability::Merger,
            spec(
                "You integrate finished branches into the canonical branch \
                 and report merge results.",
                false,
            ),
        );
        capabilities.insert(
            Capability::Coordinator,
            spec(
                "You route work across the run: watch mail, dispatch tasks, \
                 keep the fleet moving.",
                true,
            ),
        );
        capabilities.insert(
            Capability::Supervisor,
            spec(
                "You supervise a subtree of agents: monitor their progress \
                 and unblock or replace them.",
                true,
            ),
        );
        capabilities.insert(
            Capability::Monitor,
            spec(
                "You patrol fleet health summaries and escalate anomalies \
                 to the coordinator.",
                false,
            ),
        );
        Self { capabilities }
    }
}

impl Manifest {
    /// Load from a YAML file; a missing file yields the built-in manifest.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ManifestError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        serde_yaml::from_str(&text).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn get(&self, capability: Capability) -> Option<&CapabilitySpec> {
        self.capabilities.get(&capability)
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
