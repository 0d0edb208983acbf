// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run registry operations, sharing the sessions database.

use crate::sessions::{SessionStore, SessionStoreError};
use overstory_core::{Run, RunId, RunStatus};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use std::str::FromStr;

const RUN_COLUMNS: &str = "id, started_at, completed_at, agent_count, status, coordinator_session";

impl SessionStore {
    pub fn create_run(&self, run: &Run) -> Result<(), SessionStoreError> {
        self.conn.execute(
            "INSERT INTO runs (id, started_at, completed_at, agent_count, status, \
             coordinator_session) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run.id.as_str(),
                run.started_at,
                run.completed_at,
                run.agent_count,
                run.status.as_str(),
                run.coordinator_session,
            ],
        )?;
        Ok(())
    }

    pub fn get_run(&self, id: &RunId) -> Result<Option<Run>, SessionStoreError> {
        let sql = format!("SELECT {RUN_COLUMNS} FROM runs WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.as_str()], row_to_run)
            .optional()?)
    }

    /// Most recently started run with status `active`.
    pub fn get_active_run(&self) -> Result<Option<Run>, SessionStoreError> {
        let sql = format!(
            "SELECT {RUN_COLUMNS} FROM runs WHERE status = 'active' \
             ORDER BY started_at DESC, id DESC LIMIT 1"
        );
        Ok(self.conn.query_row(&sql, [], row_to_run).optional()?)
    }

    /// Runs newest-first, optionally filtered by status.
    pub fn list_runs(
        &self,
        limit: Option<u32>,
        status: Option<RunStatus>,
    ) -> Result<Vec<Run>, SessionStoreError> {
        let mut sql = format!("SELECT {RUN_COLUMNS} FROM runs");
        if status.is_some() {
            sql.push_str(" WHERE status = ?1");
        }
        sql.push_str(" ORDER BY started_at DESC, id DESC");
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut runs = Vec::new();
        match status {
            Some(s) => {
                let rows = stmt.query_map(params![s.as_str()], row_to_run)?;
                for row in rows {
                    runs.push(row?);
                }
            }
            None => {
                let rows = stmt.query_map([], row_to_run)?;
                for row in rows {
                    runs.push(row?);
                }
            }
        }
        Ok(runs)
    }

    pub fn increment_agent_count(&self, id: &RunId) -> Result<(), SessionStoreError> {
        let changed = self.conn.execute(
            "UPDATE runs SET agent_count = agent_count + 1 WHERE id = ?1",
            params![id.as_str()],
        )?;
        if changed == 0 {
            return Err(SessionStoreError::RunNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Close a run as completed or failed at `completed_at_ms`.
    pub fn complete_run(
        &self,
        id: &RunId,
        status: RunStatus,
        completed_at_ms: i64,
    ) -> Result<(), SessionStoreError> {
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?2, completed_at = ?3 WHERE id = ?1",
            params![id.as_str(), status.as_str(), completed_at_ms],
        )?;
        if changed == 0 {
            return Err(SessionStoreError::RunNotFound(id.to_string()));
        }
        Ok(())
    }
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<Run> {
    let id: String = row.get(0)?;
    let status: String = row.get(4)?;
    Ok(Run {
        id: RunId::new(id),
        started_at: row.get(1)?,
        completed_at: row.get(2)?,
        agent_count: row.get(3)?,
        status: RunStatus::from_str(&status)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        coordinator_session: row.get(5)?,
    })
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
