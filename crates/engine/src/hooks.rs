// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook-guard policy engine.
//!
//! Guards are data: self-contained POSIX shell scripts (sh + sed + grep
//! only) composed from templates plus the agent's name, capability, and
//! worktree, then deployed into the sandbox settings file where the LLM
//! host runs them before every tool call. A blocked call gets
//! `{"decision":"block","reason":"…"}` on stdout with exit 0; an allowed
//! call gets silence. Every guard is inert unless `OVERSTORY_AGENT_NAME`
//! is set, so a human operator working at the project root never trips one.

use crate::error::EngineError;
use overstory_core::Capability;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Native delegation tools; agents must go through `overstory sling`.
const TASK_TOOLS: &str = "Task|Agent|TeamCreate|SendMessage";

/// Tools that require a human on the other end.
const INTERACTIVE_TOOLS: &str = "AskUserQuestion";

/// File-writing tools.
const WRITE_TOOLS: &str = "Write|Edit|NotebookEdit";

/// Every guard starts with this so deployed guards never fire for the
/// operator's own sessions.
const ENV_SCOPE_PREFIX: &str = r#"if [ -z "${OVERSTORY_AGENT_NAME:-}" ]; then exit 0; fi
"#;

/// Shared stdin handling: `$cmd` holds the Bash tool's command string, or
/// is empty when the input was unparseable (fail open).
const EXTRACT_COMMAND: &str = r#"input=$(cat)
cmd=$(printf '%s' "$input" | sed -n 's/.*"command"[[:space:]]*:[[:space:]]*"\([^"]*\)".*/\1/p' | head -n1)
if [ -z "$cmd" ]; then exit 0; fi
"#;

/// One `PreToolUse` entry in the sandbox settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookEntry {
    pub matcher: String,
    pub hooks: Vec<HookCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookCommand {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
}

impl HookEntry {
    fn command(matcher: &str, script: String) -> Self {
        Self {
            matcher: matcher.to_string(),
            hooks: vec![HookCommand {
                kind: "command".to_string(),
                command: script,
            }],
        }
    }
}

/// Escape embedded single quotes with the POSIX `'\''` idiom so dynamic
/// content can be interpolated into single-quoted shell literals.
pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', r#"'\''"#)
}

fn block_line(reason: &str) -> String {
    format!(
        "echo '{{\"decision\":\"block\",\"reason\":\"{}\"}}'; exit 0",
        escape_single_quotes(reason)
    )
}

/// Build the full guard set for one agent. The worktree boundary is read
/// from `OVERSTORY_WORKTREE_PATH` at guard run time, not baked in, so a
/// moved checkout cannot stale the policy. The configured tracker and
/// mulch commands are baked into the read-only whitelist so renaming them
/// in config does not lock agents out of their own tooling.
pub fn build_guards(
    agent: &str,
    capability: Capability,
    tracker_cmd: &str,
    mulch_cmd: &str,
) -> Vec<HookEntry> {
    let mut entries = Vec::new();

    // Delegation and interactive tools are off for every agent.
    entries.push(HookEntry::command(
        TASK_TOOLS,
        format!(
            "{ENV_SCOPE_PREFIX}{}\n",
            block_line("delegation tools are disabled; spawn children with overstory sling")
        ),
    ));
    entries.push(HookEntry::command(
        INTERACTIVE_TOOLS,
        format!(
            "{ENV_SCOPE_PREFIX}{}\n",
            block_line("interactive tools need a human responder; agents run unattended")
        ),
    ));

    // Danger guard applies to every capability.
    entries.push(HookEntry::command("Bash", danger_guard(agent)));

    if capability.can_write_files() {
        entries.push(HookEntry::command(WRITE_TOOLS, path_boundary_guard()));
        entries.push(HookEntry::command("Bash", write_shell_guard()));
    } else {
        entries.push(HookEntry::command(
            WRITE_TOOLS,
            format!(
                "{ENV_SCOPE_PREFIX}{}\n",
                block_line(&format!("{capability} agents cannot modify files"))
            ),
        ));
        entries.push(HookEntry::command(
            "Bash",
            readonly_shell_guard(capability, tracker_cmd, mulch_cmd),
        ));
    }

    entries
}

/// Reject `git push`, `git reset --hard`, and `git checkout -b` onto a
/// branch outside this agent's `overstory/<agent>/` namespace.
fn danger_guard(agent: &str) -> String {
    let agent = escape_single_quotes(agent);
    let mut script = String::new();
    script.push_str(ENV_SCOPE_PREFIX);
    script.push_str(EXTRACT_COMMAND);
    script.push_str(&format!(
        r#"if printf '%s' "$cmd" | grep -Eq 'git[[:space:]]+push'; then
  {push_block}
fi
if printf '%s' "$cmd" | grep -Eq 'git[[:space:]]+reset[[:space:]]+--hard'; then
  {reset_block}
fi
branch=$(printf '%s' "$cmd" | sed -n 's/.*git[[:space:]]*checkout[[:space:]]*-b[[:space:]]*\([^[:space:]]*\).*/\1/p' | head -n1)
if [ -n "$branch" ]; then
  case "$branch" in
    'overstory/{agent}/'*) ;;
    *) {branch_block} ;;
  esac
fi
exit 0
"#,
        push_block = block_line("git push is not allowed from agent worktrees"),
        reset_block = block_line("git reset --hard destroys work; ask your supervisor"),
        branch_block = block_line("new branches must live under your overstory namespace"),
    ));
    script
}

/// For Write/Edit/NotebookEdit: the target path must stay inside the
/// worktree. Unparseable input fails open; the shell guard is next in line.
fn path_boundary_guard() -> String {
    let mut script = String::new();
    script.push_str(ENV_SCOPE_PREFIX);
    script.push_str(
        r#"input=$(cat)
path=$(printf '%s' "$input" | sed -n 's/.*"file_path"[[:space:]]*:[[:space:]]*"\([^"]*\)".*/\1/p' | head -n1)
if [ -z "$path" ]; then
  path=$(printf '%s' "$input" | sed -n 's/.*"notebook_path"[[:space:]]*:[[:space:]]*"\([^"]*\)".*/\1/p' | head -n1)
fi
if [ -z "$path" ]; then exit 0; fi
case "$path" in
  /*) abs="$path" ;;
  *) abs="$PWD/$path" ;;
esac
case "$abs" in
  "$OVERSTORY_WORKTREE_PATH"|"$OVERSTORY_WORKTREE_PATH"/*) exit 0 ;;
esac
"#,
    );
    script.push_str(&block_line("target path is outside your worktree"));
    script.push('\n');
    script
}

/// For implementation capabilities: a Bash command that matches a
/// file-modifying pattern must keep every absolute-path token inside the
/// worktree (or under /dev, /tmp). Relative paths are fine; cwd is the
/// worktree.
fn write_shell_guard() -> String {
    let mut script = String::new();
    script.push_str(ENV_SCOPE_PREFIX);
    script.push_str(EXTRACT_COMMAND);
    script.push_str(&format!(
        r#"if printf '%s' "$cmd" | grep -Eq '{file_modifying}'; then
  for tok in $(printf '%s' "$cmd" | grep -oE '/[^[:space:];|&"]+'); do
    case "$tok" in
      "$OVERSTORY_WORKTREE_PATH"*|/dev/*|/tmp/*) ;;
      *) {block} ;;
    esac
  done
fi
exit 0
"#,
        file_modifying = FILE_MODIFYING_PATTERN,
        block = block_line("file-modifying command touches a path outside your worktree"),
    ));
    script
}

/// ERE matching in-place edits, redirections, and destructive file commands.
const FILE_MODIFYING_PATTERN: &str = "sed[[:space:]]+-i|>>?|(^|[;&|[:space:]])(cp|mv|rm|mkdir|touch|chmod|chown|install|rsync|tee)[[:space:]]";

/// Blocklist for non-implementation capabilities: beyond file modification,
/// also mutating git verbs, package installs, and language eval flags.
const READONLY_BLOCK_PATTERN: &str = "sed[[:space:]]+-i|>>?|(^|[;&|[:space:]])(cp|mv|rm|mkdir|touch|chmod|chown|install|rsync|tee)[[:space:]]|git[[:space:]]+(add|commit|merge|push|reset|checkout|rebase|stash)|(^|[;&|[:space:]])(npm|pnpm|yarn|pip|pip3|cargo)[[:space:]]+(install|add)|bun[[:space:]]+-e|node[[:space:]]+-e|python[0-9.]*[[:space:]]+-c|perl[[:space:]]+-e|ruby[[:space:]]+-e|deno[[:space:]]+eval";

/// Same as [`READONLY_BLOCK_PATTERN`] minus `git add`/`git commit`, for
/// coordination capabilities that sync tracker files from the repo root.
const COORDINATION_BLOCK_PATTERN: &str = "sed[[:space:]]+-i|>>?|(^|[;&|[:space:]])(cp|mv|rm|mkdir|touch|chmod|chown|install|rsync|tee)[[:space:]]|git[[:space:]]+(merge|push|reset|checkout|rebase|stash)|(^|[;&|[:space:]])(npm|pnpm|yarn|pip|pip3|cargo)[[:space:]]+(install|add)|bun[[:space:]]+-e|node[[:space:]]+-e|python[0-9.]*[[:space:]]+-c|perl[[:space:]]+-e|ruby[[:space:]]+-e|deno[[:space:]]+eval";

/// Whitelist-first shell guard for capabilities that never modify files.
fn readonly_shell_guard(capability: Capability, tracker_cmd: &str, mulch_cmd: &str) -> String {
    let pattern = if capability.is_coordination() {
        COORDINATION_BLOCK_PATTERN
    } else {
        READONLY_BLOCK_PATTERN
    };
    let tracker = escape_single_quotes(tracker_cmd);
    let mulch = escape_single_quotes(mulch_cmd);
    let mut script = String::new();
    script.push_str(ENV_SCOPE_PREFIX);
    script.push_str(EXTRACT_COMMAND);
    script.push_str(&format!(
        r#"case "$cmd" in
  'overstory '*|'{tracker} '*|'{mulch} '*) exit 0 ;;
  git\ status*|git\ log*|git\ diff*|git\ show*|git\ blame*|git\ branch*) exit 0 ;;
  cargo\ test*|cargo\ check*|npm\ test*|pytest*|go\ test*|bun\ test*) exit 0 ;;
esac
"#,
    ));
    script.push_str(&format!(
        r#"if printf '%s' "$cmd" | grep -Eq '{pattern}'; then
  {block}
fi
exit 0
"#,
        block = block_line(&format!(
            "file-modifying shell commands are not allowed for {capability} agents"
        )),
    ));
    script
}

/// Whether a hook command was authored by overstory (and should be
/// replaced on re-deploy).
fn is_overstory_command(command: &str) -> bool {
    command.contains("overstory") || command.contains("OVERSTORY_")
}

/// Deploy guards into `<sandbox_dir>/settings.local.json`, merging with any
/// pre-existing user-authored entries: old overstory entries are stripped
/// and replaced, user entries are preserved, and overstory guards come
/// first so security runs before user hooks. Deploying twice produces
/// byte-identical output.
pub fn deploy(sandbox_dir: &Path, guards: &[HookEntry]) -> Result<(), EngineError> {
    std::fs::create_dir_all(sandbox_dir).map_err(|e| {
        EngineError::Generic(format!("failed to create {}: {e}", sandbox_dir.display()))
    })?;
    let path = sandbox_dir.join("settings.local.json");

    let mut root: serde_json::Value = match std::fs::read_to_string(&path) {
        Ok(text) => serde_json::from_str(&text)
            .map_err(|e| EngineError::Generic(format!("invalid {}: {e}", path.display())))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            serde_json::Value::Object(serde_json::Map::new())
        }
        Err(e) => {
            return Err(EngineError::Generic(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let user_entries: Vec<serde_json::Value> = root
        .get("hooks")
        .and_then(|h| h.get("PreToolUse"))
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| {
                    let commands = entry.get("hooks").and_then(|h| h.as_array());
                    !commands.is_some_and(|cmds| {
                        cmds.iter().any(|c| {
                            c.get("command")
                                .and_then(|v| v.as_str())
                                .is_some_and(is_overstory_command)
                        })
                    })
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let mut merged: Vec<serde_json::Value> = Vec::new();
    for guard in guards {
        merged.push(serde_json::to_value(guard).map_err(|e| {
            EngineError::Generic(format!("failed to serialize hook entry: {e}"))
        })?);
    }
    merged.extend(user_entries);

    let obj = root
        .as_object_mut()
        .ok_or_else(|| EngineError::Generic(format!("{} is not a JSON object", path.display())))?;
    let hooks = obj
        .entry("hooks")
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    let hooks_obj = hooks
        .as_object_mut()
        .ok_or_else(|| EngineError::Generic(format!("{}: hooks is not an object", path.display())))?;
    hooks_obj.insert("PreToolUse".to_string(), serde_json::Value::Array(merged));

    let mut text = serde_json::to_string_pretty(&root)
        .map_err(|e| EngineError::Generic(format!("failed to serialize settings: {e}")))?;
    text.push('\n');
    std::fs::write(&path, text)
        .map_err(|e| EngineError::Generic(format!("failed to write {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
