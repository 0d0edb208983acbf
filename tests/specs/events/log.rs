//! Event log entry points: `log`, `logs`, `trace`.

use crate::prelude::Project;

fn log_event(project: &Project, agent: &str, args: &[&str]) {
    let mut cmd = project.cmd();
    cmd.args(["log"]).args(args).args(["--agent", agent]);
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn logged_events_show_up_in_logs_chronologically() {
    let project = Project::init();
    log_event(&project, "builder-1", &["tool_start", "--tool", "Edit"]);
    log_event(
        &project,
        "builder-1",
        &["tool_end", "--tool", "Edit", "--duration-ms", "42"],
    );
    log_event(&project, "scout-1", &["custom", "--data", "looked around"]);

    let output = project.cmd().args(["logs", "builder-1"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let start_pos = stdout.find("tool_start").expect("tool_start logged");
    let end_pos = stdout.find("tool_end").expect("tool_end logged");
    assert!(start_pos < end_pos, "chronological order:\n{stdout}");
    assert!(!stdout.contains("scout-1"));

    // the global timeline sees both agents
    let output = project.cmd().args(["logs"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("builder-1"));
    assert!(stdout.contains("scout-1"));
}

#[test]
fn log_requires_an_agent_or_env() {
    let project = Project::init();
    let output = project.cmd().args(["log", "custom"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    // the hook path: agent comes from the environment
    let output = project
        .cmd()
        .env("OVERSTORY_AGENT_NAME", "env-agent")
        .args(["log", "custom"])
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn bad_event_types_are_rejected() {
    let project = Project::init();
    let output = project
        .cmd()
        .args(["log", "explosion", "--agent", "a"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("explosion"));
}

#[test]
fn trace_resolves_agents_and_rejects_strangers() {
    let project = Project::init();
    log_event(&project, "builder-1", &["tool_start", "--tool", "Read"]);

    let output = project.cmd().args(["trace", "builder-1"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("tool_start"));

    let output = project.cmd().args(["trace", "nobody"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}
