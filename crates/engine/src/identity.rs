// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity persistence under `.overstory/agents/<name>/identity.yaml`.

use crate::error::EngineError;
use overstory_core::{Capability, Identity, OverstoryPaths, TaskRecord};
use std::path::Path;

/// Load an identity when the file exists.
pub fn load(paths: &OverstoryPaths, agent: &str) -> Result<Option<Identity>, EngineError> {
    read_identity(&paths.identity(agent))
}

/// Write an identity, creating the agent directory as needed.
pub fn save(paths: &OverstoryPaths, identity: &Identity) -> Result<(), EngineError> {
    let path = paths.identity(&identity.name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| EngineError::Generic(format!("failed to create {}: {e}", parent.display())))?;
    }
    let yaml = serde_yaml::to_string(identity)
        .map_err(|e| EngineError::Generic(format!("failed to serialize identity: {e}")))?;
    std::fs::write(&path, yaml)
        .map_err(|e| EngineError::Generic(format!("failed to write {}: {e}", path.display())))?;
    Ok(())
}

/// Create the identity record if this agent name has never been seen.
/// Returns the current identity either way.
pub fn ensure(
    paths: &OverstoryPaths,
    agent: &str,
    capability: Capability,
    now_iso: &str,
) -> Result<Identity, EngineError> {
    if let Some(existing) = load(paths, agent)? {
        return Ok(existing);
    }
    let identity = Identity::new(agent, capability, now_iso);
    save(paths, &identity)?;
    Ok(identity)
}

/// Record a completed session (stop path): bump counters, merge domains,
/// push the task onto the bounded ring.
pub fn record_completion(
    paths: &OverstoryPaths,
    agent: &str,
    task: TaskRecord,
    domains: &[String],
) -> Result<(), EngineError> {
    let Some(mut identity) = load(paths, agent)? else {
        return Ok(()); // never registered; nothing to record
    };
    identity.record_completion(task, domains);
    save(paths, &identity)
}

fn read_identity(path: &Path) -> Result<Option<Identity>, EngineError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(EngineError::Generic(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    let identity = serde_yaml::from_str(&text)
        .map_err(|e| EngineError::Generic(format!("invalid identity {}: {e}", path.display())))?;
    Ok(Some(identity))
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
