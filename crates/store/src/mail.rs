// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail store: durable, at-most-once message delivery.
//!
//! The inbox drain (`check`) selects and marks unread messages inside one
//! transaction, so two concurrent drains never hand out the same message.

use crate::db;
use overstory_core::{MailMessage, MessageType, Priority, ProtocolPayload};
use rand::Rng;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors from the mail store.
#[derive(Debug, Error)]
pub enum MailStoreError {
    #[error("mail database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("no message with id {0}")]
    MessageNotFound(String),
    #[error("failed to serialize protocol payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("could not allocate a unique message id")]
    IdExhausted,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    from_agent TEXT NOT NULL,
    to_agent TEXT NOT NULL,
    subject TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    message_type TEXT NOT NULL DEFAULT 'status',
    priority TEXT NOT NULL DEFAULT 'normal',
    thread_id TEXT,
    payload TEXT,
    read INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_to_read ON messages(to_agent, read);
CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id);
";

const COLUMNS: &str = "id, from_agent, to_agent, subject, body, message_type, priority, \
     thread_id, payload, read, created_at";

/// Fields supplied by the sender; id (when empty) and created_at are
/// assigned on insert.
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub message_type: Option<MessageType>,
    pub priority: Option<Priority>,
    pub thread_id: Option<String>,
    pub payload: Option<String>,
}

/// Criteria for bulk mail removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailPurge {
    All,
    From(String),
    To(String),
}

/// Store over `.overstory/mail.db`.
pub struct MailStore {
    conn: Connection,
}

impl MailStore {
    pub fn open(path: &Path) -> Result<Self, MailStoreError> {
        let conn = db::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Checkpoint the WAL (best-effort) and close.
    pub fn close(self) {
        db::checkpoint_and_close(self.conn);
    }

    /// Insert a message, assigning id and created_at. Returns the stored row.
    pub fn send(&self, msg: NewMessage, now_ms: i64) -> Result<MailMessage, MailStoreError> {
        let message_type = msg.message_type.unwrap_or(MessageType::Status);
        let priority = msg.priority.unwrap_or(Priority::Normal);

        // A caller-supplied id is honored; an empty one gets a fresh random
        // id, retried on the (vanishingly unlikely) collision.
        let attempts = if msg.id.is_empty() { 4 } else { 1 };
        for attempt in 0..attempts {
            let id = if msg.id.is_empty() {
                generate_id()
            } else {
                msg.id.clone()
            };
            let inserted = self.conn.execute(
                "INSERT OR IGNORE INTO messages (id, from_agent, to_agent, subject, body, \
                 message_type, priority, thread_id, payload, read, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
                params![
                    id,
                    msg.from,
                    msg.to,
                    msg.subject,
                    msg.body,
                    message_type.as_str(),
                    priority.as_str(),
                    msg.thread_id,
                    msg.payload,
                    now_ms,
                ],
            )?;
            if inserted == 1 {
                return Ok(MailMessage {
                    id,
                    from: msg.from,
                    to: msg.to,
                    subject: msg.subject,
                    body: msg.body,
                    message_type,
                    priority,
                    thread_id: msg.thread_id,
                    payload: msg.payload,
                    read: false,
                    created_at: now_ms,
                });
            }
            if attempt + 1 == attempts {
                break;
            }
        }
        Err(MailStoreError::IdExhausted)
    }

    /// Protocol send: the payload structure determines the message type and
    /// is serialized into the payload column.
    pub fn send_protocol(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
        priority: Priority,
        thread_id: Option<String>,
        payload: &ProtocolPayload,
        now_ms: i64,
    ) -> Result<MailMessage, MailStoreError> {
        let serialized = serde_json::to_string(payload)?;
        self.send(
            NewMessage {
                id: String::new(),
                from: from.to_string(),
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
                message_type: Some(payload.message_type()),
                priority: Some(priority),
                thread_id,
                payload: Some(serialized),
            },
            now_ms,
        )
    }

    /// Drain the recipient's unread messages, oldest first, marking each
    /// read in the same transaction. A concurrent drain never returns the
    /// same message.
    pub fn check(&mut self, agent: &str) -> Result<Vec<MailMessage>, MailStoreError> {
        let tx = self.conn.transaction()?;
        let mut messages = {
            let sql = format!(
                "SELECT {COLUMNS} FROM messages WHERE to_agent = ?1 AND read = 0 \
                 ORDER BY created_at, id"
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt.query_map(params![agent], row_to_message)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            out
        };
        for msg in &mut messages {
            tx.execute("UPDATE messages SET read = 1 WHERE id = ?1", params![msg.id])?;
            msg.read = true;
        }
        tx.commit()?;
        Ok(messages)
    }

    pub fn unread_count(&self, agent: &str) -> Result<i64, MailStoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE to_agent = ?1 AND read = 0",
            params![agent],
            |row| row.get(0),
        )?)
    }

    pub fn get(&self, id: &str) -> Result<Option<MailMessage>, MailStoreError> {
        let sql = format!("SELECT {COLUMNS} FROM messages WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_message)
            .optional()?)
    }

    /// Messages newest-first, optionally restricted to one recipient.
    pub fn list(
        &self,
        agent: Option<&str>,
        limit: u32,
    ) -> Result<Vec<MailMessage>, MailStoreError> {
        let sql = match agent {
            Some(_) => format!(
                "SELECT {COLUMNS} FROM messages WHERE to_agent = ?1 \
                 ORDER BY created_at DESC, id DESC LIMIT {limit}"
            ),
            None => format!(
                "SELECT {COLUMNS} FROM messages ORDER BY created_at DESC, id DESC LIMIT {limit}"
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let mut messages = Vec::new();
        match agent {
            Some(name) => {
                let rows = stmt.query_map(params![name], row_to_message)?;
                for row in rows {
                    messages.push(row?);
                }
            }
            None => {
                let rows = stmt.query_map([], row_to_message)?;
                for row in rows {
                    messages.push(row?);
                }
            }
        }
        Ok(messages)
    }

    /// Idempotently mark a message read. Returns whether it was already
    /// read; an unknown id is an error carrying that id.
    pub fn mark_read(&self, id: &str) -> Result<bool, MailStoreError> {
        let already: Option<bool> = self
            .conn
            .query_row(
                "SELECT read FROM messages WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match already {
            None => Err(MailStoreError::MessageNotFound(id.to_string())),
            Some(true) => Ok(true),
            Some(false) => {
                self.conn
                    .execute("UPDATE messages SET read = 1 WHERE id = ?1", params![id])?;
                Ok(false)
            }
        }
    }

    /// Bulk-remove messages matching the filter; returns the affected-row
    /// count. Zero-match criteria return 0 and mutate nothing.
    pub fn purge(&self, filter: &MailPurge) -> Result<usize, MailStoreError> {
        let changed = match filter {
            MailPurge::All => self.conn.execute("DELETE FROM messages", [])?,
            MailPurge::From(sender) => self.conn.execute(
                "DELETE FROM messages WHERE from_agent = ?1",
                params![sender],
            )?,
            MailPurge::To(agent) => self
                .conn
                .execute("DELETE FROM messages WHERE to_agent = ?1", params![agent])?,
        };
        Ok(changed)
    }
}

/// 12 characters, lowercase alphanumeric, from the thread-local CSPRNG.
fn generate_id() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..12)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<MailMessage> {
    let message_type: String = row.get(5)?;
    let priority: String = row.get(6)?;
    Ok(MailMessage {
        id: row.get(0)?,
        from: row.get(1)?,
        to: row.get(2)?,
        subject: row.get(3)?,
        body: row.get(4)?,
        message_type: MessageType::from_str(&message_type)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        priority: Priority::from_str(&priority)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
        thread_id: row.get(7)?,
        payload: row.get(8)?,
        read: row.get(9)?,
        created_at: row.get(10)?,
    })
}

#[cfg(test)]
#[path = "mail_tests.rs"]
mod tests;
