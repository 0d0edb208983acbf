//! Scenario: clean skips unmerged non-lead worktrees until forced.

use crate::prelude::Project;

/// Create a worktree + branch the way the spawn pipeline would, then give
/// the branch an unmerged commit.
fn unmerged_worktree(project: &Project, agent: &str, task: &str) -> String {
    let branch = format!("overstory/{agent}/{task}");
    let path = project.meta().join("worktrees").join(agent);
    project.git(&[
        "worktree",
        "add",
        "-b",
        &branch,
        path.to_str().unwrap(),
        "main",
    ]);
    std::fs::write(path.join("wip.txt"), "not merged yet\n").unwrap();
    crate::prelude::git(&path, &["add", "."]);
    crate::prelude::git(&path, &["commit", "-q", "-m", "wip"]);
    branch
}

#[test]
fn clean_skips_unmerged_then_force_removes() {
    let project = Project::init();
    let branch = unmerged_worktree(&project, "b1", "proj-abc1");
    let worktree = project.meta().join("worktrees/b1");

    let output = project.cmd().args(["worktree", "clean"]).output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Skipped 1 worktree"), "stdout: {stdout}");
    assert!(stdout.contains(&branch), "stdout: {stdout}");
    assert!(worktree.is_dir(), "worktree must survive a non-forced clean");

    let output = project
        .cmd()
        .args(["worktree", "clean", "--force"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cleaned 1 worktree"), "stdout: {stdout}");
    assert!(!worktree.exists());

    // branch went with it
    let branches = std::process::Command::new("git")
        .current_dir(project.path())
        .args(["branch", "--list", &branch])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&branches.stdout).trim().is_empty());
}

#[test]
fn clean_removes_merged_worktrees_without_force() {
    let project = Project::init();
    let branch = "overstory/b2/proj-abc2";
    let path = project.meta().join("worktrees/b2");
    // no extra commits: the fresh branch is an ancestor of main
    project.git(&[
        "worktree",
        "add",
        "-b",
        branch,
        path.to_str().unwrap(),
        "main",
    ]);

    let output = project.cmd().args(["worktree", "clean"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cleaned 1 worktree"), "stdout: {stdout}");
    assert!(!path.exists());
}

#[test]
fn worktree_list_shows_only_overstory_branches() {
    let project = Project::init();
    unmerged_worktree(&project, "b3", "proj-abc3");

    let output = project.cmd().args(["worktree", "list"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("overstory/b3/proj-abc3"));
    assert!(!stdout.contains(" main "));
}
