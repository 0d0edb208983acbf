//! Run registry surface.

use crate::prelude::Project;

#[test]
fn fresh_projects_have_no_runs() {
    let project = Project::init();
    let output = project.cmd().args(["run", "list"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("no runs"));
}

#[test]
fn completing_without_an_active_run_fails() {
    let project = Project::init();
    let output = project.cmd().args(["run", "complete"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no active run"));
}

#[test]
fn showing_an_unknown_run_fails_with_its_id() {
    let project = Project::init();
    let output = project
        .cmd()
        .args(["run", "show", "run-19990101-000000"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("run-19990101-000000"));
}

#[test]
fn status_without_a_run_reports_none() {
    let project = Project::init();
    let output = project.cmd().arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no active run"));
    assert!(stdout.contains("no active agents"));
}
