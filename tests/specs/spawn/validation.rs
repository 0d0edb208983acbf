//! Spawn preconditions that fail before any state is touched.
//!
//! Happy-path spawning needs tmux and a tracker; those flows are covered
//! against fakes in the engine's own tests. Here we pin the validation
//! surface of the real binary.

use crate::prelude::Project;

#[test]
fn parentless_builder_is_a_hierarchy_error_with_nothing_created() {
    let project = Project::init();
    let output = project
        .cmd()
        .args([
            "sling",
            "proj-abc1",
            "--capability",
            "builder",
            "--name",
            "builder-1",
            "--allow-root",
            "--skip-tracker-check",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error [hierarchy]:"), "stderr: {stderr}");
    assert!(stderr.contains("lead"), "stderr: {stderr}");

    // nothing created on disk
    assert!(!project.meta().join("current-run.txt").exists());
    let worktrees: Vec<_> = std::fs::read_dir(project.meta().join("worktrees"))
        .unwrap()
        .collect();
    assert!(worktrees.is_empty());
}

#[test]
fn depth_beyond_max_is_rejected_at_the_boundary() {
    let project = Project::init();
    std::fs::write(project.meta().join("config.yaml"), "maxDepth: 2\n").unwrap();

    let output = project
        .cmd()
        .args([
            "sling",
            "proj-abc1",
            "--capability",
            "builder",
            "--parent",
            "lead-1",
            "--depth",
            "3",
            "--name",
            "builder-1",
            "--allow-root",
            "--skip-tracker-check",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error [validation]:"), "stderr: {stderr}");
    assert!(stderr.contains("maxDepth"), "stderr: {stderr}");
}

#[test]
fn unknown_capability_is_a_usage_error() {
    let project = Project::init();
    let output = project
        .cmd()
        .args(["sling", "proj-abc1", "--capability", "wizard"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("wizard"));
}

#[test]
fn missing_spec_file_is_a_validation_error() {
    let project = Project::init();
    let output = project
        .cmd()
        .args([
            "sling",
            "proj-abc1",
            "--name",
            "lead-1",
            "--spec",
            ".overstory/specs/absent.md",
            "--allow-root",
            "--skip-tracker-check",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error [validation]:"), "stderr: {stderr}");
}
