// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event store: the append-only activity timeline.
//!
//! Inserts come from short-lived hook processes and must stay cheap: one
//! prepared statement, no read amplification. Rows are immutable after
//! insert.

use crate::db;
use overstory_core::{AgentEvent, EventLevel, EventType, NewEvent, ToolStat};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors from the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("event database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT,
    agent_name TEXT NOT NULL,
    session_id TEXT,
    event_type TEXT NOT NULL,
    tool_name TEXT,
    tool_args TEXT,
    duration_ms INTEGER,
    level TEXT NOT NULL DEFAULT 'info',
    data TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_agent ON events(agent_name, created_at);
CREATE INDEX IF NOT EXISTS idx_events_run ON events(run_id, created_at);
CREATE INDEX IF NOT EXISTS idx_events_type ON events(event_type);
";

const COLUMNS: &str = "id, run_id, agent_name, session_id, event_type, tool_name, tool_args, \
     duration_ms, level, data, created_at";

/// Bounds for a timeline query.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Epoch ms lower bound (inclusive).
    pub since: Option<i64>,
    /// Epoch ms upper bound (inclusive).
    pub until: Option<i64>,
    /// Keep only the most recent `limit` rows (still returned oldest-first).
    pub limit: Option<u32>,
}

/// Store over `.overstory/events.db`.
pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    pub fn open(path: &Path) -> Result<Self, EventStoreError> {
        let conn = db::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Checkpoint the WAL (best-effort) and close.
    pub fn close(self) {
        db::checkpoint_and_close(self.conn);
    }

    /// Append one event; returns the assigned row id.
    pub fn append(&self, event: &NewEvent, now_ms: i64) -> Result<i64, EventStoreError> {
        self.conn.execute(
            "INSERT INTO events (run_id, agent_name, session_id, event_type, tool_name, \
             tool_args, duration_ms, level, data, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                event.run_id,
                event.agent_name,
                event.session_id,
                event.event_type.unwrap_or(EventType::Custom).as_str(),
                event.tool_name,
                event.tool_args,
                event.duration_ms,
                event.level.unwrap_or(EventLevel::Info).as_str(),
                event.data,
                now_ms,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// One agent's events, oldest first.
    pub fn get_by_agent(
        &self,
        name: &str,
        query: &EventQuery,
    ) -> Result<Vec<AgentEvent>, EventStoreError> {
        self.query_window("agent_name = ?1", params![name], query)
    }

    /// One run's events, oldest first.
    pub fn get_by_run(
        &self,
        run_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<AgentEvent>, EventStoreError> {
        self.query_window("run_id = ?1", params![run_id], query)
    }

    /// The global timeline, oldest first.
    pub fn get_timeline(&self, query: &EventQuery) -> Result<Vec<AgentEvent>, EventStoreError> {
        self.query_window("1=1", params![], query)
    }

    /// Per-tool aggregate over `tool_end` events (they carry the duration).
    pub fn get_tool_stats(&self, agent: Option<&str>) -> Result<Vec<ToolStat>, EventStoreError> {
        let sql = match agent {
            Some(_) => {
                "SELECT tool_name, COUNT(*), AVG(duration_ms), MAX(duration_ms) FROM events \
                 WHERE event_type = 'tool_end' AND tool_name IS NOT NULL AND agent_name = ?1 \
                 GROUP BY tool_name ORDER BY COUNT(*) DESC, tool_name"
            }
            None => {
                "SELECT tool_name, COUNT(*), AVG(duration_ms), MAX(duration_ms) FROM events \
                 WHERE event_type = 'tool_end' AND tool_name IS NOT NULL \
                 GROUP BY tool_name ORDER BY COUNT(*) DESC, tool_name"
            }
        };
        let map = |row: &Row<'_>| -> rusqlite::Result<ToolStat> {
            Ok(ToolStat {
                tool_name: row.get(0)?,
                count: row.get(1)?,
                avg_duration_ms: row.get(2)?,
                max_duration_ms: row.get(3)?,
            })
        };
        let mut stmt = self.conn.prepare(sql)?;
        let mut stats = Vec::new();
        match agent {
            Some(name) => {
                let rows = stmt.query_map(params![name], map)?;
                for row in rows {
                    stats.push(row?);
                }
            }
            None => {
                let rows = stmt.query_map([], map)?;
                for row in rows {
                    stats.push(row?);
                }
            }
        }
        Ok(stats)
    }

    /// Windowed query: apply since/until, keep the most recent `limit`
    /// rows, return them oldest-first.
    fn query_window(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
        query: &EventQuery,
    ) -> Result<Vec<AgentEvent>, EventStoreError> {
        let mut sql = format!("SELECT {COLUMNS} FROM events WHERE {filter}");
        if let Some(since) = query.since {
            sql.push_str(&format!(" AND created_at >= {since}"));
        }
        if let Some(until) = query.until {
            sql.push_str(&format!(" AND created_at <= {until}"));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, row_to_event)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        events.reverse();
        Ok(events)
    }
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<AgentEvent> {
    let event_type: String = row.get(4)?;
    let level: String = row.get(8)?;
    Ok(AgentEvent {
        id: row.get(0)?,
        run_id: row.get(1)?,
        agent_name: row.get(2)?,
        session_id: row.get(3)?,
        event_type: EventType::from_str(&event_type)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        tool_name: row.get(5)?,
        tool_args: row.get(6)?,
        duration_ms: row.get(7)?,
        level: EventLevel::from_str(&level)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?,
        data: row.get(9)?,
        created_at: row.get(10)?,
    })
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
