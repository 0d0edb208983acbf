// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use overstory_core::Capability;

/// Guards with the default tracker/mulch commands.
fn guards(agent: &str, capability: Capability) -> Vec<HookEntry> {
    build_guards(agent, capability, "bd", "mulch")
}

#[test]
fn single_quote_escaping_uses_the_posix_idiom() {
    assert_eq!(escape_single_quotes("it's"), r#"it'\''s"#);
    assert_eq!(escape_single_quotes("no quotes"), "no quotes");
    assert_eq!(escape_single_quotes("''"), r#"'\'''\''"#);
}

#[test]
fn every_guard_is_env_scoped() {
    for cap in Capability::ALL {
        for entry in guards("builder-1", cap) {
            for hook in &entry.hooks {
                assert!(
                    hook.command
                        .starts_with(r#"if [ -z "${OVERSTORY_AGENT_NAME:-}" ]; then exit 0; fi"#),
                    "{cap}/{}: {}",
                    entry.matcher,
                    hook.command
                );
            }
        }
    }
}

#[test]
fn blocked_response_is_valid_json() {
    for entry in guards("builder-1", Capability::Scout) {
        for hook in &entry.hooks {
            for line in hook.command.lines() {
                if let Some(start) = line.find("echo '") {
                    let rest = &line[start + 6..];
                    if let Some(end) = rest.find('\'') {
                        let json = &rest[..end];
                        let value: serde_json::Value = serde_json::from_str(json)
                            .unwrap_or_else(|e| panic!("bad JSON {json}: {e}"));
                        assert_eq!(value["decision"], "block");
                        assert!(!value["reason"].as_str().unwrap().is_empty());
                    }
                }
            }
        }
    }
}

#[test]
fn scouts_get_write_tools_blocked() {
    let guards = guards("scout-1", Capability::Scout);
    let write_guard = guards
        .iter()
        .find(|g| g.matcher == "Write|Edit|NotebookEdit")
        .unwrap();
    assert!(write_guard.hooks[0].command.contains("cannot modify files"));
}

#[test]
fn builders_get_the_path_boundary_instead_of_a_write_block() {
    let guards = guards("builder-1", Capability::Builder);
    let write_guard = guards
        .iter()
        .find(|g| g.matcher == "Write|Edit|NotebookEdit")
        .unwrap();
    let cmd = &write_guard.hooks[0].command;
    assert!(cmd.contains("OVERSTORY_WORKTREE_PATH"));
    assert!(cmd.contains("file_path"));
    assert!(cmd.contains("notebook_path"));
    assert!(!cmd.contains("cannot modify files"));
}

#[test]
fn danger_guard_pins_the_branch_namespace() {
    let guards = guards("builder-1", Capability::Builder);
    let bash_cmds: Vec<&str> = guards
        .iter()
        .filter(|g| g.matcher == "Bash")
        .map(|g| g.hooks[0].command.as_str())
        .collect();
    let danger = bash_cmds
        .iter()
        .find(|c| c.contains("git push"))
        .unwrap();
    assert!(danger.contains("'overstory/builder-1/'*"));
    assert!(danger.contains("--hard"));
}

#[test]
fn danger_guard_escapes_agent_names() {
    let guards = guards("o'brien", Capability::Builder);
    let danger = guards
        .iter()
        .filter(|g| g.matcher == "Bash")
        .map(|g| g.hooks[0].command.as_str())
        .find(|c| c.contains("git push"))
        .unwrap();
    assert!(danger.contains(r#"o'\''brien"#));
}

#[test]
fn readonly_whitelist_uses_the_configured_commands() {
    let guards = build_guards("scout-1", Capability::Scout, "beads-cli", "mulch2");
    let readonly = guards
        .iter()
        .filter(|g| g.matcher == "Bash")
        .map(|g| g.hooks[0].command.as_str())
        .find(|c| c.contains("file-modifying shell commands"))
        .unwrap();
    assert!(readonly.contains("'beads-cli '*"), "{readonly}");
    assert!(readonly.contains("'mulch2 '*"), "{readonly}");
    assert!(!readonly.contains("'bd '*"));

    // interpolated commands go through the single-quote escape
    let guards = build_guards("scout-1", Capability::Scout, "it's-bd", "mulch");
    let readonly = guards
        .iter()
        .filter(|g| g.matcher == "Bash")
        .map(|g| g.hooks[0].command.as_str())
        .find(|c| c.contains("file-modifying shell commands"))
        .unwrap();
    assert!(readonly.contains(r#"it'\''s-bd"#), "{readonly}");
}

#[test]
fn coordination_capabilities_keep_git_add_and_commit() {
    let lead = guards("lead-1", Capability::Lead);
    let lead_readonly = lead
        .iter()
        .filter(|g| g.matcher == "Bash")
        .map(|g| g.hooks[0].command.as_str())
        .find(|c| c.contains("file-modifying shell commands"))
        .unwrap();
    assert!(!lead_readonly.contains("add|commit"));
    // push stays blocked through the danger guard regardless
    assert!(lead_readonly.contains("git[[:space:]]+(merge|push|reset|checkout|rebase|stash)"));

    let scout = guards("scout-1", Capability::Scout);
    let scout_readonly = scout
        .iter()
        .filter(|g| g.matcher == "Bash")
        .map(|g| g.hooks[0].command.as_str())
        .find(|c| c.contains("file-modifying shell commands"))
        .unwrap();
    assert!(scout_readonly.contains("git[[:space:]]+(add|commit|merge|push|reset|checkout|rebase|stash)"));
}

#[test]
fn deploy_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = dir.path().join(".claude");
    let guards = guards("builder-1", Capability::Builder);

    deploy(&sandbox, &guards).unwrap();
    let first = std::fs::read(sandbox.join("settings.local.json")).unwrap();
    deploy(&sandbox, &guards).unwrap();
    let second = std::fs::read(sandbox.join("settings.local.json")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn deploy_preserves_user_entries_after_overstory_guards() {
    let dir = tempfile::tempdir().unwrap();
    let sandbox = dir.path().join(".claude");
    std::fs::create_dir_all(&sandbox).unwrap();
    std::fs::write(
        sandbox.join("settings.local.json"),
        serde_json::json!({
            "permissions": { "allow": ["Bash(ls:*)"] },
            "hooks": {
                "PreToolUse": [
                    { "matcher": "Bash",
                      "hooks": [{ "type": "command", "command": "echo user-hook" }] },
                    { "matcher": "Bash",
                      "hooks": [{ "type": "command",
                                  "command": "stale OVERSTORY_AGENT_NAME guard" }] }
                ]
            }
        })
        .to_string(),
    )
    .unwrap();

    let guards = guards("builder-1", Capability::Builder);
    deploy(&sandbox, &guards).unwrap();

    let text = std::fs::read_to_string(sandbox.join("settings.local.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    // unrelated top-level keys survive
    assert_eq!(value["permissions"]["allow"][0], "Bash(ls:*)");

    let entries = value["hooks"]["PreToolUse"].as_array().unwrap();
    // stale overstory entry stripped, user entry kept, guards first
    let commands: Vec<&str> = entries
        .iter()
        .flat_map(|e| e["hooks"].as_array().unwrap())
        .map(|h| h["command"].as_str().unwrap())
        .collect();
    assert!(!commands.iter().any(|c| c.contains("stale OVERSTORY")));
    assert_eq!(*commands.last().unwrap(), "echo user-hook");
    assert!(commands[0].contains("OVERSTORY_AGENT_NAME"));
    assert_eq!(entries.len(), guards.len() + 1);
}
