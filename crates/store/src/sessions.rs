// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session store: the authoritative registry of live and retired agents.
//!
//! One row per agent name (unique index); the opaque `id` column lets a name
//! be re-used once the prior session is terminal. Run rows share this
//! database (see `runs.rs`). `run_id` is kept referentially honest by write
//! discipline rather than a foreign key so runs can be pruned without
//! cascade risk.

use crate::db;
use overstory_core::{AgentSession, AgentState, Capability, PurgeFilter, RunId};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("no session named {0}")]
    SessionNotFound(String),
    #[error("no run with id {0}")]
    RunNotFound(String),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    capability TEXT NOT NULL,
    state TEXT NOT NULL CHECK (state IN ('booting','working','stalled','completed','zombie')),
    task_id TEXT NOT NULL DEFAULT '',
    branch TEXT NOT NULL DEFAULT '',
    worktree_path TEXT NOT NULL DEFAULT '',
    tmux_session TEXT NOT NULL DEFAULT '',
    pid INTEGER,
    run_id TEXT,
    parent_agent TEXT,
    depth INTEGER NOT NULL DEFAULT 0,
    last_activity INTEGER NOT NULL,
    escalation_level INTEGER NOT NULL DEFAULT 0,
    stalled_since INTEGER,
    created_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_name ON sessions(name);

CREATE TABLE IF NOT EXISTS runs (
    id TEXT PRIMARY KEY,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    agent_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL CHECK (status IN ('active','completed','failed')),
    coordinator_session TEXT
);
";

const SELECT_COLUMNS: &str = "id, name, capability, state, task_id, branch, worktree_path, \
     tmux_session, pid, run_id, parent_agent, depth, last_activity, \
     escalation_level, stalled_since, created_at";

/// Store over `.overstory/sessions.db`.
pub struct SessionStore {
    pub(crate) conn: Connection,
}

impl SessionStore {
    /// Open the store, creating tables and applying the one-time
    /// `bead_id` → `task_id` migration when needed.
    pub fn open(path: &Path) -> Result<Self, SessionStoreError> {
        let conn = db::open(path)?;
        migrate_task_id_column(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Checkpoint the WAL (best-effort) and close.
    pub fn close(self) {
        db::checkpoint_and_close(self.conn);
    }

    /// Insert or full-row replace by agent name.
    pub fn upsert(&self, session: &AgentSession) -> Result<(), SessionStoreError> {
        let worktree_path = session.worktree_path.to_string_lossy().into_owned();
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions (id, name, capability, state, task_id, branch, \
             worktree_path, tmux_session, pid, run_id, parent_agent, depth, last_activity, \
             escalation_level, stalled_since, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                session.id,
                session.name,
                session.capability.as_str(),
                session.state.as_str(),
                session.task_id,
                session.branch,
                worktree_path,
                session.tmux_session,
                session.pid,
                session.run_id.as_ref().map(|r| r.as_str()),
                session.parent_agent,
                session.depth,
                session.last_activity,
                session.escalation_level,
                session.stalled_since,
                session.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<AgentSession>, SessionStoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM sessions WHERE name = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![name], row_to_session)
            .optional()?)
    }

    /// Sessions in a non-terminal state, oldest first.
    pub fn get_active(&self) -> Result<Vec<AgentSession>, SessionStoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM sessions \
             WHERE state IN ('booting','working','stalled') ORDER BY created_at, id"
        );
        self.query_sessions(&sql, params![])
    }

    pub fn get_all(&self) -> Result<Vec<AgentSession>, SessionStoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM sessions ORDER BY created_at, id");
        self.query_sessions(&sql, params![])
    }

    pub fn count(&self) -> Result<i64, SessionStoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?)
    }

    pub fn get_by_run(&self, run_id: &RunId) -> Result<Vec<AgentSession>, SessionStoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM sessions WHERE run_id = ?1 ORDER BY created_at, id"
        );
        self.query_sessions(&sql, params![run_id.as_str()])
    }

    pub fn update_state(&self, name: &str, state: AgentState) -> Result<(), SessionStoreError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET state = ?2 WHERE name = ?1",
            params![name, state.as_str()],
        )?;
        if changed == 0 {
            return Err(SessionStoreError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Record hook-observed activity at `now_ms`.
    pub fn update_last_activity(&self, name: &str, now_ms: i64) -> Result<(), SessionStoreError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET last_activity = ?2 WHERE name = ?1",
            params![name, now_ms],
        )?;
        if changed == 0 {
            return Err(SessionStoreError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    pub fn update_escalation(
        &self,
        name: &str,
        level: u32,
        stalled_since: Option<i64>,
    ) -> Result<(), SessionStoreError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET escalation_level = ?2, stalled_since = ?3 WHERE name = ?1",
            params![name, level, stalled_since],
        )?;
        if changed == 0 {
            return Err(SessionStoreError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Remove a row; returns whether anything was removed.
    pub fn remove(&self, name: &str) -> Result<bool, SessionStoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE name = ?1", params![name])?;
        Ok(changed > 0)
    }

    /// Bulk-remove rows matching the filter; returns the affected-row count.
    pub fn purge(&self, filter: &PurgeFilter) -> Result<usize, SessionStoreError> {
        let changed = match filter {
            PurgeFilter::All => self.conn.execute("DELETE FROM sessions", [])?,
            PurgeFilter::State(state) => self.conn.execute(
                "DELETE FROM sessions WHERE state = ?1",
                params![state.as_str()],
            )?,
            PurgeFilter::Agent(name) => self
                .conn
                .execute("DELETE FROM sessions WHERE name = ?1", params![name])?,
        };
        Ok(changed)
    }

    fn query_sessions(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<AgentSession>, SessionStoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_session)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<AgentSession> {
    let capability: String = row.get(2)?;
    let state: String = row.get(3)?;
    let worktree_path: String = row.get(6)?;
    let run_id: Option<String> = row.get(9)?;
    Ok(AgentSession {
        id: row.get(0)?,
        name: row.get(1)?,
        capability: Capability::from_str(&capability)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        state: AgentState::from_str(&state)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        task_id: row.get(4)?,
        branch: row.get(5)?,
        worktree_path: PathBuf::from(worktree_path),
        tmux_session: row.get(7)?,
        pid: row.get(8)?,
        run_id: run_id.map(RunId::new),
        parent_agent: row.get(10)?,
        depth: row.get(11)?,
        last_activity: row.get(12)?,
        escalation_level: row.get(13)?,
        stalled_since: row.get(14)?,
        created_at: row.get(15)?,
    })
}

/// One-time historical rename, applied idempotently on open: detect via
/// table-info pragma, rename only when the old column is present and the
/// new one absent.
fn migrate_task_id_column(conn: &Connection) -> rusqlite::Result<()> {
    let mut has_old = false;
    let mut has_new = false;
    {
        let mut stmt = conn.prepare("PRAGMA table_info(sessions)")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for name in names {
            match name?.as_str() {
                "bead_id" => has_old = true,
                "task_id" => has_new = true,
                _ => {}
            }
        }
    }
    if has_old && !has_new {
        tracing::info!("migrating sessions.bead_id to task_id");
        conn.execute_batch("ALTER TABLE sessions RENAME COLUMN bead_id TO task_id;")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
