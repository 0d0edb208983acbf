//! Help output and exit codes.

use crate::prelude::Project;

#[test]
fn help_exits_zero() {
    let project = Project::bare();
    let output = project.cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("sling"));
    assert!(text.contains("watch"));
    assert!(text.contains("mail"));
}

#[test]
fn subcommand_help_exits_zero() {
    let project = Project::bare();
    for sub in ["sling", "mail", "worktree", "run", "watch"] {
        let output = project.cmd().args([sub, "--help"]).output().unwrap();
        assert!(output.status.success(), "{sub} --help");
    }
}

#[test]
fn version_prints() {
    let project = Project::bare();
    let output = project.cmd().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("overstory"));
}
