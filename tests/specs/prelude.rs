//! Shared helpers for the behavioral specs.

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// A scratch project: a git repository with `.overstory/` initialized.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    /// Create a git repo with one commit, then run `overstory init`.
    pub fn init() -> Self {
        let project = Self::bare();
        project.cmd().arg("init").assert().success();
        project
    }

    /// Create a git repo with one commit but no `.overstory/`.
    pub fn bare() -> Self {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q", "-b", "main"]);
        git(dir.path(), &["config", "user.email", "spec@example.com"]);
        git(dir.path(), &["config", "user.name", "Spec"]);
        std::fs::write(dir.path().join("README.md"), "spec scratch\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn meta(&self) -> PathBuf {
        self.dir.path().join(".overstory")
    }

    /// An `overstory` invocation rooted in this project.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("overstory").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("OVERSTORY_AGENT_NAME")
            .env_remove("OVERSTORY_WORKTREE_PATH");
        cmd
    }

    pub fn git(&self, args: &[&str]) {
        git(self.dir.path(), args);
    }
}

pub fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .current_dir(dir)
        .args(args)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}
