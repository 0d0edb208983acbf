// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree manager and merge safety.
//!
//! Owns every git-worktree and branch operation and guarantees that
//! cleanup never silently drops committed work: non-lead branches must be
//! merged (or forced) before removal, and lead branches get their
//! `.seeds/` tracker records preserved onto the canonical branch first.

use crate::error::EngineError;
use overstory_adapters::{GitAdapter, SessionAdapter};
use overstory_core::{AgentState, Capability, OverstoryPaths};
use overstory_store::{MailPurge, MailStore, SessionStore};
use std::path::{Path, PathBuf};

/// Branch namespace prefix for every agent branch.
pub const BRANCH_PREFIX: &str = "overstory/";

/// `overstory/{agent}/{task}`.
pub fn branch_for(agent: &str, task_id: &str) -> String {
    format!("{BRANCH_PREFIX}{agent}/{task_id}")
}

/// Agent name encoded in an overstory branch, when it is one.
pub fn agent_of_branch(branch: &str) -> Option<&str> {
    branch.strip_prefix(BRANCH_PREFIX)?.split('/').next()
}

/// Options for the operator-facing clean walk.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Only clean worktrees whose session reached a terminal state.
    pub completed_only: bool,
    /// Remove unmerged non-lead branches too.
    pub force: bool,
}

/// Outcome of one clean walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub cleaned: usize,
    pub failed: usize,
    /// Branches skipped because they are unmerged (and not forced).
    pub skipped: Vec<String>,
    /// Zombie session rows pruned because their worktree is gone.
    pub pruned: usize,
    pub mail_purged: usize,
    pub seeds_preserved: usize,
}

/// Policy layer over the git adapter.
pub struct WorktreeManager<G> {
    git: G,
    paths: OverstoryPaths,
    canonical: String,
}

impl<G: GitAdapter> WorktreeManager<G> {
    pub fn new(git: G, paths: OverstoryPaths, canonical: impl Into<String>) -> Self {
        Self {
            git,
            paths,
            canonical: canonical.into(),
        }
    }

    /// Create the agent's worktree and branch. Returns `(path, branch)`.
    pub async fn create(&self, agent: &str, task_id: &str) -> Result<(PathBuf, String), EngineError> {
        let path = self.paths.worktree(agent);
        let branch = branch_for(agent, task_id);
        self.git
            .worktree_add(&path, &branch, &self.canonical)
            .await?;
        Ok((path, branch))
    }

    /// Remove a worktree and delete its branch.
    ///
    /// The worktree is always force-removed (deployed sandbox files are
    /// untracked and would block a plain remove). The branch goes with
    /// `-d` when the merge has been verified, `-D` when forced; a
    /// branch-delete failure is non-fatal.
    pub async fn remove(
        &self,
        path: &Path,
        branch: &str,
        merge_verified: bool,
        force_branch: bool,
    ) -> Result<(), EngineError> {
        self.git.worktree_remove(path, true).await?;
        let force = force_branch || !merge_verified;
        if let Err(e) = self.git.branch_delete(branch, force).await {
            tracing::warn!(branch, error = %e, "branch delete failed (non-fatal)");
        }
        Ok(())
    }

    /// Best-effort rollback of a half-created worktree (spawn failure path).
    pub async fn rollback(&self, path: &Path, branch: &str) {
        if let Err(e) = self.git.worktree_remove(path, true).await {
            tracing::warn!(path = %path.display(), error = %e, "rollback worktree remove failed");
        }
        if let Err(e) = self.git.branch_delete(branch, true).await {
            tracing::warn!(branch, error = %e, "rollback branch delete failed");
        }
    }

    /// Preserve a lead's `.seeds/` tracker records onto the canonical
    /// branch before its worktree is removed. Returns whether anything was
    /// preserved. On any failure after staging, staged and working changes
    /// under `.seeds/` are reverted. The temp diff file is always deleted.
    pub async fn preserve_seeds(&self, branch: &str, lead: &str) -> Result<bool, EngineError> {
        let range = format!("{}...{}", self.canonical, branch);
        let diff = self.git.diff_range(&range, ".seeds/").await?;
        if diff.trim().is_empty() {
            return Ok(false);
        }

        let current = self.git.current_branch().await?;
        if current != self.canonical {
            return Err(EngineError::Worktree(overstory_adapters::GitError::CommandFailed {
                action: "preserve seeds".into(),
                stderr: format!(
                    "repo root is on {current}, not {}; refusing to apply",
                    self.canonical
                ),
            }));
        }
        if !self.git.is_path_clean(".seeds/").await? {
            return Err(EngineError::Worktree(overstory_adapters::GitError::CommandFailed {
                action: "preserve seeds".into(),
                stderr: ".seeds/ is dirty on the canonical branch".into(),
            }));
        }

        let patch_path = self.paths.meta_dir().join(format!("seeds-{lead}.patch"));
        std::fs::write(&patch_path, &diff).map_err(|e| {
            EngineError::Generic(format!("failed to write {}: {e}", patch_path.display()))
        })?;

        let result = self.apply_and_commit(&patch_path, lead).await;
        let _ = std::fs::remove_file(&patch_path);
        result.map(|()| true)
    }

    async fn apply_and_commit(&self, patch: &Path, lead: &str) -> Result<(), EngineError> {
        if let Err(e) = self.git.apply_index(patch).await {
            let _ = self.git.revert_path(".seeds/").await;
            return Err(e.into());
        }
        if let Err(e) = self
            .git
            .commit(&format!("chore: preserve .seeds/ changes from lead {lead}"))
            .await
        {
            let _ = self.git.revert_path(".seeds/").await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Operator-facing clean walk over every overstory-prefixed worktree.
    pub async fn clean<S: SessionAdapter>(
        &self,
        options: &CleanOptions,
        sessions: &SessionStore,
        mail: &MailStore,
        session_adapter: &S,
    ) -> Result<CleanReport, EngineError> {
        let mut report = CleanReport::default();

        for worktree in self.git.worktree_list().await? {
            let Some(branch) = worktree.branch.clone() else {
                continue;
            };
            let Some(agent) = agent_of_branch(&branch).map(str::to_string) else {
                continue;
            };

            let session = sessions.get_by_name(&agent)?;
            let capability = session.as_ref().map(|s| s.capability);
            let is_lead = capability == Some(Capability::Lead);

            if options.completed_only {
                if let Some(s) = &session {
                    if !s.state.is_terminal() {
                        continue;
                    }
                }
            }

            if !is_lead && !options.force {
                let merged = self.git.is_branch_merged(&branch, &self.canonical).await?;
                if !merged {
                    report.skipped.push(branch);
                    continue;
                }
            }

            // the multiplexer session must not outlive its worktree
            if let Some(s) = &session {
                if !s.tmux_session.is_empty()
                    && session_adapter.is_alive(&s.tmux_session).await.unwrap_or(false)
                {
                    let _ = session_adapter.kill(&s.tmux_session).await;
                }
            }

            if is_lead {
                match self.preserve_seeds(&branch, &agent).await {
                    Ok(true) => report.seeds_preserved += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(branch = %branch, error = %e, "seeds preservation failed; leaving worktree");
                        report.failed += 1;
                        continue;
                    }
                }
            }

            let merge_verified = !is_lead && !options.force;
            if let Err(e) = self
                .remove(&worktree.path, &branch, merge_verified, is_lead || options.force)
                .await
            {
                tracing::warn!(branch = %branch, error = %e, "worktree removal failed");
                report.failed += 1;
                continue;
            }
            report.cleaned += 1;

            report.mail_purged += mail.purge(&MailPurge::To(agent.clone()))?;
            if session.is_some() {
                // terminal-state transition is synchronized with removal
                let _ = sessions.update_state(&agent, AgentState::Zombie);
            }
        }

        // prune zombie rows whose worktree vanished from disk
        for row in sessions.get_all()? {
            if row.state == AgentState::Zombie && !row.worktree_path.exists() {
                if sessions.remove(&row.name)? {
                    report.pruned += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "worktrees_tests.rs"]
mod tests;
