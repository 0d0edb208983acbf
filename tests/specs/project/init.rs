//! `overstory init` behavior.

use crate::prelude::Project;

#[test]
fn init_creates_the_metadata_layout() {
    let project = Project::init();
    let meta = project.meta();

    for entry in [
        "config.yaml",
        "manifest.yaml",
        "sessions.db",
        "mail.db",
        "events.db",
        ".gitignore",
    ] {
        assert!(meta.join(entry).exists(), "missing {entry}");
    }
    for dir in ["agents", "worktrees", "specs", "logs"] {
        assert!(meta.join(dir).is_dir(), "missing {dir}/");
    }
}

#[test]
fn init_is_idempotent_and_preserves_edits() {
    let project = Project::init();
    let config = project.meta().join("config.yaml");
    std::fs::write(&config, "maxDepth: 1\n").unwrap();

    project.cmd().arg("init").assert().success();
    assert_eq!(
        std::fs::read_to_string(&config).unwrap(),
        "maxDepth: 1\n",
        "init must not clobber an edited config"
    );
}

#[test]
fn init_outside_a_git_repo_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("overstory").unwrap();
    let output = cmd.current_dir(dir.path()).arg("init").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn status_works_from_a_nested_directory() {
    let project = Project::init();
    let nested = project.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();

    let mut cmd = assert_cmd::Command::cargo_bin("overstory").unwrap();
    let output = cmd.current_dir(&nested).arg("status").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("no active agents"));
}
