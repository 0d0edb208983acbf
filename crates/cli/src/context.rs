// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project context: discovery, config, and store handles.
//!
//! Loaded once per invocation; nothing here outlives the process.

use anyhow::Result;
use overstory_core::{Config, Manifest, OverstoryPaths, SystemClock};
use overstory_store::{EventStore, MailStore, SessionStore};
use thiserror::Error;

/// Marker error for the "not initialized" special case. Rendered by main
/// as the canonical hint line, without the `Error [...]` prefix.
#[derive(Debug, Error)]
#[error("not in an overstory project")]
pub struct NotInProject;

/// Everything a command needs about the current project.
pub struct ProjectContext {
    pub paths: OverstoryPaths,
    pub config: Config,
    pub manifest: Manifest,
    pub clock: SystemClock,
}

impl ProjectContext {
    /// Discover the project from the current directory.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let paths = OverstoryPaths::discover(&cwd).ok_or(NotInProject)?;
        let config = Config::load(&paths.config())?;
        let manifest = Manifest::load(&paths.manifest())?;
        Ok(Self {
            paths,
            config,
            manifest,
            clock: SystemClock,
        })
    }

    pub fn sessions(&self) -> Result<SessionStore> {
        Ok(SessionStore::open(&self.paths.sessions_db())?)
    }

    pub fn mail(&self) -> Result<MailStore> {
        Ok(MailStore::open(&self.paths.mail_db())?)
    }

    pub fn events(&self) -> Result<EventStore> {
        Ok(EventStore::open(&self.paths.events_db())?)
    }

    pub fn project_name(&self) -> String {
        self.config.project_name(self.paths.project_root())
    }

    pub fn now_ms(&self) -> i64 {
        use overstory_core::Clock;
        self.clock.now_ms()
    }
}
