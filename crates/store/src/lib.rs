// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! overstory-store: The three embedded SQLite databases.
//!
//! Sessions + runs, mail, and events each live in their own database file
//! under `.overstory/`. Every connection runs in WAL mode with a 5-second
//! busy timeout; cross-process coordination is the database's own locking,
//! never in-process mutexes.

pub mod db;
pub mod events;
pub mod mail;
mod runs;
pub mod sessions;

pub use events::{EventQuery, EventStore, EventStoreError};
pub use mail::{MailPurge, MailStore, MailStoreError, NewMessage};
pub use sessions::{SessionStore, SessionStoreError};
