//! Behavioral specifications for the overstory CLI.
//!
//! These tests are black-box: they invoke the compiled binary inside a
//! git-initialized tempdir and verify stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// project/
#[path = "specs/project/init.rs"]
mod project_init;

// mail/
#[path = "specs/mail/routing.rs"]
mod mail_routing;

// events/
#[path = "specs/events/log.rs"]
mod events_log;

// spawn/
#[path = "specs/spawn/validation.rs"]
mod spawn_validation;

// runs/
#[path = "specs/runs/registry.rs"]
mod runs_registry;

// worktree/
#[path = "specs/worktree/clean.rs"]
mod worktree_clean;
