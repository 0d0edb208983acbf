// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{beacon_text, send_beacon, wait_for_tui_ready};
use overstory_adapters::{FakeSessionAdapter, SessionAdapter};
use overstory_core::Capability;
use std::path::Path;
use std::time::Duration;

#[test]
fn beacon_has_three_emdash_segments() {
    let text = beacon_text(
        "builder-1",
        Capability::Builder,
        "2026-08-01T09:20:00Z",
        "proj-abc1",
        1,
        Some("lead-1"),
    );
    let segments: Vec<&str> = text.split(" — ").collect();
    assert_eq!(segments.len(), 3);
    assert_eq!(
        segments[0],
        "[OVERSTORY] builder-1 (builder) 2026-08-01T09:20:00Z task:proj-abc1"
    );
    assert_eq!(segments[1], "Depth: 1 | Parent: lead-1");
    assert!(segments[2].starts_with("Startup: read .claude/CLAUDE.md"));
    assert!(segments[2].contains("overstory mail check --agent builder-1"));
    assert!(segments[2].ends_with("then begin task proj-abc1"));
}

#[test]
fn beacon_for_taskless_roles_says_none() {
    let text = beacon_text(
        "monitor",
        Capability::Monitor,
        "2026-08-01T09:20:00Z",
        "",
        0,
        None,
    );
    assert!(text.contains("task:none"));
    assert!(text.contains("Parent: none"));
}

#[tokio::test]
async fn ready_poll_sees_the_marker() {
    let adapter = FakeSessionAdapter::new();
    adapter
        .spawn("s", Path::new("/tmp"), "claude", &[])
        .await
        .unwrap();
    adapter.set_output("s", "Welcome!\n? for shortcuts\n");

    let ready = wait_for_tui_ready(&adapter, "s", "? for shortcuts", 3, Duration::from_millis(1)).await;
    assert!(ready);
}

#[tokio::test]
async fn ready_poll_gives_up_after_bounded_attempts() {
    let adapter = FakeSessionAdapter::new();
    adapter
        .spawn("s", Path::new("/tmp"), "claude", &[])
        .await
        .unwrap();
    adapter.set_output("s", "still booting");

    let ready = wait_for_tui_ready(&adapter, "s", "? for shortcuts", 3, Duration::from_millis(1)).await;
    assert!(!ready);
}

#[tokio::test]
async fn beacon_send_is_text_then_three_submissions() {
    let adapter = FakeSessionAdapter::new();
    adapter
        .spawn("s", Path::new("/tmp"), "claude", &[])
        .await
        .unwrap();

    send_beacon(&adapter, "s", "[OVERSTORY] hello").await.unwrap();

    assert_eq!(adapter.sent_texts("s"), vec!["[OVERSTORY] hello"]);
    let enters = adapter
        .calls()
        .iter()
        .filter(|c| matches!(c, overstory_adapters::SessionCall::SendEnter { .. }))
        .count();
    assert_eq!(enters, 3);
}
