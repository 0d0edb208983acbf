// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git adapter: worktree, branch, and merge-ancestry operations.
//!
//! Policy (which branch may be deleted, when seeds are preserved) lives in
//! the engine; this adapter only runs git and reports what happened.

use crate::subprocess::{run_with_timeout, GIT_TIMEOUT};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Errors from git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("git {action} failed: {stderr}")]
    CommandFailed { action: String, stderr: String },
    #[error("{0}")]
    Subprocess(String),
    #[error("unexpected git output: {0}")]
    Parse(String),
}

/// One entry from `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    pub head: String,
    /// Branch name with the `refs/heads/` prefix stripped; `None` for a
    /// detached or bare entry.
    pub branch: Option<String>,
}

/// Adapter over the git binary.
#[async_trait]
pub trait GitAdapter: Clone + Send + Sync + 'static {
    /// `git worktree add -b {branch} {path} {base}`.
    async fn worktree_add(&self, path: &Path, branch: &str, base: &str) -> Result<(), GitError>;

    async fn worktree_list(&self) -> Result<Vec<WorktreeInfo>, GitError>;

    /// `git worktree remove [--force] {path}`.
    async fn worktree_remove(&self, path: &Path, force: bool) -> Result<(), GitError>;

    /// `git branch -d|-D {branch}`.
    async fn branch_delete(&self, branch: &str, force: bool) -> Result<(), GitError>;

    /// `git merge-base --is-ancestor {branch} {target}`: exit 0 ⇒ merged,
    /// exit 1 ⇒ not merged, anything else is an error.
    async fn is_branch_merged(&self, branch: &str, target: &str) -> Result<bool, GitError>;

    async fn current_branch(&self) -> Result<String, GitError>;

    /// Diff text for `git diff {range} -- {pathspec}` (empty when clean).
    async fn diff_range(&self, range: &str, pathspec: &str) -> Result<String, GitError>;

    /// Whether `git status --porcelain -- {pathspec}` is empty.
    async fn is_path_clean(&self, pathspec: &str) -> Result<bool, GitError>;

    /// `git apply --index {patch}`.
    async fn apply_index(&self, patch: &Path) -> Result<(), GitError>;

    async fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Drop staged and working-tree changes under `pathspec`.
    async fn revert_path(&self, pathspec: &str) -> Result<(), GitError>;
}

/// Git adapter running the real binary rooted at one repository.
#[derive(Clone)]
pub struct CliGit {
    repo_root: PathBuf,
}

impl CliGit {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    async fn run(&self, action: &str, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo_root).args(args);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, &format!("git {action}"))
            .await
            .map_err(GitError::Subprocess)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                action: action.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl GitAdapter for CliGit {
    async fn worktree_add(&self, path: &Path, branch: &str, base: &str) -> Result<(), GitError> {
        let path_str = path.to_string_lossy();
        self.run(
            "worktree add",
            &["worktree", "add", "-b", branch, &path_str, base],
        )
        .await?;
        Ok(())
    }

    async fn worktree_list(&self) -> Result<Vec<WorktreeInfo>, GitError> {
        let output = self
            .run("worktree list", &["worktree", "list", "--porcelain"])
            .await?;
        Ok(parse_worktree_porcelain(&output))
    }

    async fn worktree_remove(&self, path: &Path, force: bool) -> Result<(), GitError> {
        let path_str = path.to_string_lossy().into_owned();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_str);
        self.run("worktree remove", &args).await?;
        Ok(())
    }

    async fn branch_delete(&self, branch: &str, force: bool) -> Result<(), GitError> {
        let flag = if force { "-D" } else { "-d" };
        self.run("branch delete", &["branch", flag, branch]).await?;
        Ok(())
    }

    async fn is_branch_merged(&self, branch: &str, target: &str) -> Result<bool, GitError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo_root)
            .args(["merge-base", "--is-ancestor", branch, target]);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, "git merge-base")
            .await
            .map_err(GitError::Subprocess)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GitError::CommandFailed {
                action: "merge-base --is-ancestor".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    async fn current_branch(&self) -> Result<String, GitError> {
        let output = self
            .run("rev-parse", &["rev-parse", "--abbrev-ref", "HEAD"])
            .await?;
        Ok(output.trim().to_string())
    }

    async fn diff_range(&self, range: &str, pathspec: &str) -> Result<String, GitError> {
        self.run("diff", &["diff", range, "--", pathspec]).await
    }

    async fn is_path_clean(&self, pathspec: &str) -> Result<bool, GitError> {
        let output = self
            .run("status", &["status", "--porcelain", "--", pathspec])
            .await?;
        Ok(output.trim().is_empty())
    }

    async fn apply_index(&self, patch: &Path) -> Result<(), GitError> {
        let patch_str = patch.to_string_lossy();
        self.run("apply", &["apply", "--index", &patch_str]).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run("commit", &["commit", "-m", message]).await?;
        Ok(())
    }

    async fn revert_path(&self, pathspec: &str) -> Result<(), GitError> {
        self.run("reset", &["reset", "-q", "HEAD", "--", pathspec])
            .await?;
        self.run("checkout", &["checkout", "-q", "--", pathspec])
            .await?;
        // files introduced by a failed apply are untracked after the reset
        self.run("clean", &["clean", "-fdq", "--", pathspec]).await?;
        Ok(())
    }
}

/// Parse `git worktree list --porcelain` output.
///
/// Entries are blank-line separated blocks of `worktree <path>`,
/// `HEAD <sha>`, and `branch <ref>` (or `detached` / `bare`).
pub fn parse_worktree_porcelain(output: &str) -> Vec<WorktreeInfo> {
    let mut entries = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut head = String::new();
    let mut branch: Option<String> = None;

    let mut flush = |path: &mut Option<PathBuf>, head: &mut String, branch: &mut Option<String>| {
        if let Some(p) = path.take() {
            entries.push(WorktreeInfo {
                path: p,
                head: std::mem::take(head),
                branch: branch.take(),
            });
        }
    };

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            flush(&mut path, &mut head, &mut branch);
        } else if let Some(rest) = line.strip_prefix("worktree ") {
            flush(&mut path, &mut head, &mut branch);
            path = Some(PathBuf::from(rest));
        } else if let Some(rest) = line.strip_prefix("HEAD ") {
            head = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("branch ") {
            branch = Some(
                rest.strip_prefix("refs/heads/")
                    .unwrap_or(rest)
                    .to_string(),
            );
        }
        // `detached` and `bare` leave branch as None
    }
    flush(&mut path, &mut head, &mut branch);
    entries
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{GitAdapter, GitError, WorktreeInfo};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeGitState {
        worktrees: Vec<WorktreeInfo>,
        merged: HashSet<String>,
        deleted_branches: Vec<(String, bool)>,
        current_branch: String,
        seeds_diff: String,
        path_clean: bool,
        commits: Vec<String>,
        applied: Vec<PathBuf>,
        reverted: Vec<String>,
        fail_worktree_add: bool,
    }

    /// In-memory git fake. `worktree_add` creates the directory on disk so
    /// callers can write into it like they would with real git.
    #[derive(Clone)]
    pub struct FakeGit {
        inner: Arc<Mutex<FakeGitState>>,
    }

    impl Default for FakeGit {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeGitState {
                    current_branch: "main".to_string(),
                    path_clean: true,
                    ..FakeGitState::default()
                })),
            }
        }
    }

    impl FakeGit {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn mark_merged(&self, branch: &str) {
            self.inner.lock().merged.insert(branch.to_string());
        }

        pub fn set_current_branch(&self, branch: &str) {
            self.inner.lock().current_branch = branch.to_string();
        }

        pub fn set_seeds_diff(&self, diff: &str) {
            self.inner.lock().seeds_diff = diff.to_string();
        }

        pub fn set_path_clean(&self, clean: bool) {
            self.inner.lock().path_clean = clean;
        }

        pub fn fail_next_worktree_add(&self) {
            self.inner.lock().fail_worktree_add = true;
        }

        pub fn worktrees(&self) -> Vec<WorktreeInfo> {
            self.inner.lock().worktrees.clone()
        }

        pub fn deleted_branches(&self) -> Vec<(String, bool)> {
            self.inner.lock().deleted_branches.clone()
        }

        pub fn commits(&self) -> Vec<String> {
            self.inner.lock().commits.clone()
        }

        pub fn reverted_paths(&self) -> Vec<String> {
            self.inner.lock().reverted.clone()
        }
    }

    #[async_trait]
    impl GitAdapter for FakeGit {
        async fn worktree_add(
            &self,
            path: &Path,
            branch: &str,
            _base: &str,
        ) -> Result<(), GitError> {
            {
                let mut state = self.inner.lock();
                if state.fail_worktree_add {
                    state.fail_worktree_add = false;
                    return Err(GitError::CommandFailed {
                        action: "worktree add".into(),
                        stderr: "scripted failure".into(),
                    });
                }
                state.worktrees.push(WorktreeInfo {
                    path: path.to_path_buf(),
                    head: "0000000000000000000000000000000000000000".into(),
                    branch: Some(branch.to_string()),
                });
            }
            std::fs::create_dir_all(path).map_err(|e| GitError::Subprocess(e.to_string()))?;
            Ok(())
        }

        async fn worktree_list(&self) -> Result<Vec<WorktreeInfo>, GitError> {
            Ok(self.inner.lock().worktrees.clone())
        }

        async fn worktree_remove(&self, path: &Path, _force: bool) -> Result<(), GitError> {
            self.inner.lock().worktrees.retain(|w| w.path != path);
            let _ = std::fs::remove_dir_all(path);
            Ok(())
        }

        async fn branch_delete(&self, branch: &str, force: bool) -> Result<(), GitError> {
            self.inner
                .lock()
                .deleted_branches
                .push((branch.to_string(), force));
            Ok(())
        }

        async fn is_branch_merged(&self, branch: &str, _target: &str) -> Result<bool, GitError> {
            Ok(self.inner.lock().merged.contains(branch))
        }

        async fn current_branch(&self) -> Result<String, GitError> {
            Ok(self.inner.lock().current_branch.clone())
        }

        async fn diff_range(&self, _range: &str, _pathspec: &str) -> Result<String, GitError> {
            Ok(self.inner.lock().seeds_diff.clone())
        }

        async fn is_path_clean(&self, _pathspec: &str) -> Result<bool, GitError> {
            Ok(self.inner.lock().path_clean)
        }

        async fn apply_index(&self, patch: &Path) -> Result<(), GitError> {
            self.inner.lock().applied.push(patch.to_path_buf());
            Ok(())
        }

        async fn commit(&self, message: &str) -> Result<(), GitError> {
            self.inner.lock().commits.push(message.to_string());
            Ok(())
        }

        async fn revert_path(&self, pathspec: &str) -> Result<(), GitError> {
            self.inner.lock().reverted.push(pathspec.to_string());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGit;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
