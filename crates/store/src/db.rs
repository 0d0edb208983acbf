// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared connection setup for the embedded databases.

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Busy-wait budget for cross-process write contention.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) a database with the shared pragmas:
/// WAL journal, 5s busy timeout, synchronous=NORMAL.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    if let Some(parent) = path.parent() {
        // Creation failure surfaces as the open error below.
        let _ = std::fs::create_dir_all(parent);
    }
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // journal_mode returns the resulting mode as a row
    conn.query_row("PRAGMA journal_mode=WAL", [], |_row| Ok(()))?;
    conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
    Ok(conn)
}

/// Issue a passive WAL checkpoint and drop the connection.
///
/// Short-lived CLI invocations would otherwise let the WAL grow without
/// bound; the checkpoint is best-effort and never blocks writers.
pub fn checkpoint_and_close(conn: Connection) {
    if let Err(e) = conn.query_row("PRAGMA wal_checkpoint(PASSIVE)", [], |_row| Ok(())) {
        tracing::warn!(error = %e, "wal checkpoint failed on close");
    }
    drop(conn);
}
