// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::run_with_timeout;
use std::time::Duration;
use tokio::process::Command;

#[tokio::test]
async fn successful_command_returns_output() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn timeout_produces_descriptive_error() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(50), "sleepy test")
        .await
        .unwrap_err();
    assert!(err.contains("sleepy test"));
    assert!(err.contains("timed out"));
}

#[tokio::test]
async fn missing_binary_produces_descriptive_error() {
    let cmd = Command::new("definitely-not-a-real-binary-xyz");
    let err = run_with_timeout(cmd, Duration::from_secs(1), "missing binary")
        .await
        .unwrap_err();
    assert!(err.contains("missing binary"));
    assert!(err.contains("failed"));
}
