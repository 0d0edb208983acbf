// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run resolution via the `current-run.txt` advisory pointer.
//!
//! The pointer is last-writer-wins and tolerated to race: worst case two
//! spawns create two runs and the later pointer write wins, which is
//! exactly the semantics of "one wave per pointer".

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use overstory_core::{OverstoryPaths, Run, RunId, RunStatus};
use overstory_store::SessionStore;

/// Derive a run id from a wall-clock instant (`run-YYYYMMDD-HHMMSS`).
pub fn run_id_for(now_ms: i64) -> RunId {
    let ts = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    RunId::new(format!("run-{}", ts.format("%Y%m%d-%H%M%S")))
}

/// Read the current-run pointer, creating a run (and the pointer) when
/// absent. The returned run row is guaranteed to exist.
pub fn resolve_current_run(
    paths: &OverstoryPaths,
    store: &SessionStore,
    now_ms: i64,
) -> Result<RunId, EngineError> {
    let pointer = paths.current_run();
    if let Ok(text) = std::fs::read_to_string(&pointer) {
        let id = RunId::new(text.trim());
        if !id.as_str().is_empty() {
            // advisory pointer: re-create the row if someone pruned it
            if store.get_run(&id)?.is_none() {
                store.create_run(&new_run(id.clone(), now_ms))?;
            }
            return Ok(id);
        }
    }

    let id = run_id_for(now_ms);
    if store.get_run(&id)?.is_none() {
        store.create_run(&new_run(id.clone(), now_ms))?;
    }
    std::fs::write(&pointer, format!("{}\n", id)).map_err(|e| {
        EngineError::Generic(format!("failed to write {}: {e}", pointer.display()))
    })?;
    Ok(id)
}

/// Clear the pointer when it names the given run (used when closing a run).
pub fn clear_pointer_if_current(paths: &OverstoryPaths, id: &RunId) {
    let pointer = paths.current_run();
    if let Ok(text) = std::fs::read_to_string(&pointer) {
        if text.trim() == id.as_str() {
            let _ = std::fs::remove_file(&pointer);
        }
    }
}

fn new_run(id: RunId, now_ms: i64) -> Run {
    Run {
        id,
        started_at: now_ms,
        completed_at: None,
        agent_count: 0,
        status: RunStatus::Active,
        coordinator_session: None,
    }
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
