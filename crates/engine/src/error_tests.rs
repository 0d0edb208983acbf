// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{EngineError, ErrorCode};

#[test]
fn codes_are_stable_strings() {
    assert_eq!(ErrorCode::Validation.as_str(), "validation");
    assert_eq!(ErrorCode::Hierarchy.as_str(), "hierarchy");
    assert_eq!(ErrorCode::Agent.as_str(), "agent");
    assert_eq!(ErrorCode::Worktree.as_str(), "worktree");
    assert_eq!(ErrorCode::Mail.as_str(), "mail");
    assert_eq!(ErrorCode::Group.as_str(), "group");
    assert_eq!(ErrorCode::Tracker.as_str(), "tracker");
    assert_eq!(ErrorCode::Generic.as_str(), "generic");
}

#[test]
fn agent_errors_carry_the_agent_name() {
    let err = EngineError::for_agent("builder-1", "worktree creation failed");
    assert_eq!(err.code(), ErrorCode::Agent);
    let text = err.to_string();
    assert!(text.contains("builder-1"));
    assert!(text.contains("worktree creation failed"));
}

#[test]
fn variants_map_to_their_codes() {
    assert_eq!(
        EngineError::Validation("x".into()).code(),
        ErrorCode::Validation
    );
    assert_eq!(
        EngineError::Hierarchy("x".into()).code(),
        ErrorCode::Hierarchy
    );
    assert_eq!(EngineError::Group("x".into()).code(), ErrorCode::Group);
    assert_eq!(EngineError::Generic("x".into()).code(), ErrorCode::Generic);
}
