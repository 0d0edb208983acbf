// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

/// Random prefix for this test run to avoid conflicts with parallel runs.
static TEST_PREFIX: LazyLock<String> = LazyLock::new(|| {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    format!("ovt{:04x}", nanos & 0xFFFF)
});

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_name(suffix: &str) -> String {
    let id = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", *TEST_PREFIX, suffix, id)
}

fn tmux_available() -> bool {
    std::process::Command::new("tmux")
        .arg("-V")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

macro_rules! skip_without_tmux {
    () => {
        if !tmux_available() {
            eprintln!("skipping: tmux not available");
            return;
        }
    };
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_send_capture_kill_roundtrip() {
    skip_without_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("roundtrip");

    adapter
        .spawn(&name, Path::new("/tmp"), "cat", &[])
        .await
        .unwrap();
    assert!(adapter.is_alive(&name).await.unwrap());

    adapter.send_literal(&name, "marker-text").await.unwrap();
    adapter.send_enter(&name).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let output = adapter.capture_output(&name, 20).await.unwrap();
    assert!(output.contains("marker-text"), "output: {output}");

    adapter.kill(&name).await.unwrap();
    assert!(!adapter.is_alive(&name).await.unwrap());
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_passes_environment() {
    skip_without_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("env");
    let env = vec![("OVERSTORY_AGENT_NAME".to_string(), "env-probe".to_string())];

    adapter
        .spawn(
            &name,
            Path::new("/tmp"),
            "sh -c 'echo agent=$OVERSTORY_AGENT_NAME && sleep 60'",
            &env,
        )
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let output = adapter.capture_output(&name, 10).await.unwrap();
    assert!(output.contains("agent=env-probe"), "output: {output}");

    let _ = adapter.kill(&name).await;
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_rejects_missing_cwd() {
    skip_without_tmux!();
    let adapter = TmuxAdapter::new();
    let err = adapter
        .spawn(
            &unique_name("badcwd"),
            Path::new("/definitely/not/a/dir"),
            "true",
            &[],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::SpawnFailed(_)));
}

#[tokio::test]
#[serial(tmux)]
async fn pane_pid_reports_for_live_sessions() {
    skip_without_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("pid");
    adapter
        .spawn(&name, Path::new("/tmp"), "sleep 60", &[])
        .await
        .unwrap();

    let pid = adapter.pane_pid(&name).await.unwrap();
    assert!(pid.is_some());

    let _ = adapter.kill(&name).await;
}

#[tokio::test]
#[serial(tmux)]
async fn kill_is_idempotent() {
    skip_without_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("kill");
    adapter
        .spawn(&name, Path::new("/tmp"), "sleep 60", &[])
        .await
        .unwrap();
    adapter.kill(&name).await.unwrap();
    // second kill of a dead session is fine
    adapter.kill(&name).await.unwrap();
}
