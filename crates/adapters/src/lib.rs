// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! overstory-adapters: Subprocess-backed collaborators.
//!
//! Everything the orchestrator consumes from outside its own process lives
//! behind a trait here: tmux sessions, git worktrees, the task tracker, and
//! the mulch knowledge helper. Fakes are available for tests (and for other
//! crates via the `test-support` feature).

pub mod git;
pub mod mulch;
pub mod session;
pub mod subprocess;
pub mod tracker;

pub use git::{CliGit, GitAdapter, GitError, WorktreeInfo};
pub use mulch::{CliMulch, MulchAdapter};
pub use session::{SessionAdapter, SessionError, TmuxAdapter};
pub use subprocess::run_with_timeout;
pub use tracker::{BeadsTracker, TrackerAdapter, TrackerError, TrackerIssue};

#[cfg(any(test, feature = "test-support"))]
pub use git::FakeGit;
#[cfg(any(test, feature = "test-support"))]
pub use mulch::FakeMulch;
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSession, FakeSessionAdapter, SessionCall};
#[cfg(any(test, feature = "test-support"))]
pub use tracker::FakeTracker;
