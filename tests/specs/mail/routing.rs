//! Mail bus behavior through the CLI: send, drain-once, reply routing,
//! idempotent reads, purge.

use crate::prelude::Project;

fn send(project: &Project, from: &str, to: &str, subject: &str, body: &str) -> String {
    let output = project
        .cmd()
        .args([
            "mail", "send", "--from", from, "--to", to, "--subject", subject, "--body", body,
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    // "sent <id> to <recipient>"
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .nth(1)
        .expect("send prints the id")
        .to_string()
}

#[test]
fn check_drains_each_message_exactly_once() {
    let project = Project::init();
    send(&project, "orch", "sb", "first", "1");
    send(&project, "orch", "sb", "second", "2");

    let output = project
        .cmd()
        .args(["mail", "check", "--agent", "sb"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("first"));
    assert!(stdout.contains("second"));

    // drained: a second check sees nothing
    let output = project
        .cmd()
        .args(["mail", "check", "--agent", "sb"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("no unread mail"));
}

#[test]
fn hook_format_is_empty_for_an_empty_inbox() {
    let project = Project::init();
    let output = project
        .cmd()
        .args(["mail", "check", "--agent", "nobody", "--format"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn hook_format_includes_count_and_reply_hint() {
    let project = Project::init();
    send(&project, "lead-1", "builder-1", "scope", "stay in src/");

    let output = project
        .cmd()
        .args(["mail", "check", "--agent", "builder-1", "--format"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("You have 1 unread message:"));
    assert!(stdout.contains("---"));
    assert!(stdout.contains("From: lead-1"));
    assert!(stdout.contains("overstory mail reply"));
}

#[test]
fn reply_routes_to_the_other_side() {
    let project = Project::init();
    let id = send(&project, "orch", "sb", "Task", "go");

    // the original sender's reply goes to the original recipient
    let output = project
        .cmd()
        .args(["mail", "reply", &id, "--from", "orch", "--body", "also Y"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("to sb"));

    // the recipient's reply goes back to the sender
    let output = project
        .cmd()
        .args(["mail", "reply", &id, "--from", "sb", "--body", "ok"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("to orch"));

    // both replies thread under the original
    let output = project
        .cmd()
        .args(["--json", "mail", "list", "--agent", "sb"])
        .output()
        .unwrap();
    let listed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("mail list --json parses");
    let threads: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["thread_id"].as_str())
        .collect();
    assert!(threads.iter().all(|t| *t == id));
}

#[test]
fn read_is_idempotent() {
    let project = Project::init();
    let id = send(&project, "a", "b", "s", "x");

    let first = project.cmd().args(["mail", "read", &id]).output().unwrap();
    assert!(String::from_utf8_lossy(&first.stdout).contains("marked"));
    let second = project.cmd().args(["mail", "read", &id]).output().unwrap();
    assert!(String::from_utf8_lossy(&second.stdout).contains("already read"));
}

#[test]
fn group_send_with_no_active_agents_is_a_group_error() {
    let project = Project::init();
    let output = project
        .cmd()
        .args([
            "mail", "send", "--from", "orch", "--to", "@all", "--subject", "s", "--body", "b",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error [group]:"), "stderr: {stderr}");
    assert!(stderr.contains("zero recipients"));
}

#[test]
fn purge_reports_affected_rows() {
    let project = Project::init();
    send(&project, "a", "b", "1", "x");
    send(&project, "a", "c", "2", "x");

    let output = project
        .cmd()
        .args(["mail", "purge", "--from", "a"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("purged 2 messages"));

    let output = project
        .cmd()
        .args(["mail", "purge", "--from", "a"])
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("purged 0 messages"));
}
