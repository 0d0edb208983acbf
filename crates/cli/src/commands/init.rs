// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory init` - Set up .overstory/ in the current repository

use anyhow::{bail, Result};
use overstory_core::{Config, Manifest, OverstoryPaths};
use overstory_store::{EventStore, MailStore, SessionStore};
use std::path::Path;

pub async fn init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    if !is_git_repo(&cwd) {
        bail!("not a git repository; run overstory init at the repository root");
    }

    let paths = OverstoryPaths::at(&cwd);
    std::fs::create_dir_all(paths.meta_dir())?;
    std::fs::create_dir_all(paths.agents_dir())?;
    std::fs::create_dir_all(paths.worktrees_dir())?;
    std::fs::create_dir_all(paths.specs_dir())?;
    std::fs::create_dir_all(paths.logs_dir())?;

    if !paths.config().exists() {
        std::fs::write(paths.config(), serde_yaml::to_string(&Config::default())?)?;
        println!("wrote {}", paths.config().display());
    }
    if !paths.manifest().exists() {
        std::fs::write(
            paths.manifest(),
            serde_yaml::to_string(&Manifest::default())?,
        )?;
        println!("wrote {}", paths.manifest().display());
    }

    // create the databases so the first hook-invoked insert never races
    // schema creation
    SessionStore::open(&paths.sessions_db())?.close();
    MailStore::open(&paths.mail_db())?.close();
    EventStore::open(&paths.events_db())?.close();

    ensure_gitignore(paths.meta_dir())?;

    println!("initialized overstory in {}", paths.meta_dir().display());
    Ok(())
}

fn is_git_repo(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Keep databases and worktrees out of version control; the config and
/// manifest are meant to be committed.
fn ensure_gitignore(meta_dir: &Path) -> Result<()> {
    let path = meta_dir.join(".gitignore");
    if path.exists() {
        return Ok(());
    }
    std::fs::write(
        &path,
        "*.db\n*.db-wal\n*.db-shm\nworktrees/\nlogs/\nwatchdog.pid\ncurrent-run.txt\n*.patch\n",
    )?;
    Ok(())
}
