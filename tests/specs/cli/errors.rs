//! Error rendering: single-line `Error [<code>]:` messages, exit code 1,
//! and the not-initialized hint.

use crate::prelude::Project;

#[test]
fn outside_a_project_prints_the_init_hint() {
    let project = Project::bare(); // git repo, no .overstory
    let output = project.cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Not in an overstory project. Run 'overstory init' first."),
        "stderr: {stderr}"
    );
}

#[test]
fn unknown_subcommands_suggest_the_nearest_command() {
    let project = Project::bare();
    let output = project.cmd().arg("slingg").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sling"), "stderr: {stderr}");
}

#[test]
fn validation_errors_are_single_line_with_code() {
    let project = Project::init();
    // empty agent name is a validation failure ahead of any side effect
    let output = project
        .cmd()
        .args([
            "sling",
            "proj-abc1",
            "--name",
            " ",
            "--allow-root",
            "--skip-tracker-check",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error [validation]:"), "stderr: {stderr}");
}

#[test]
fn mail_errors_carry_the_message_id() {
    let project = Project::init();
    let output = project
        .cmd()
        .args(["mail", "read", "missing00000"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error [mail]:"), "stderr: {stderr}");
    assert!(stderr.contains("missing00000"), "stderr: {stderr}");
}
