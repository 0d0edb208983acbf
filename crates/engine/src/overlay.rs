// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent overlay document (`<worktree>/.claude/CLAUDE.md`).
//!
//! The overlay is the agent's standing orders: who it is, what it owns,
//! how to report, and what it must not touch. Rendering is deterministic
//! so re-deploys are diffable.

use crate::error::EngineError;
use overstory_core::Capability;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Everything the overlay template needs.
#[derive(Debug, Clone)]
pub struct OverlayContext {
    pub agent_name: String,
    pub capability: Capability,
    pub task_id: String,
    pub spec_path: Option<PathBuf>,
    pub branch: String,
    pub worktree_path: PathBuf,
    pub file_scope: Vec<String>,
    pub domain_tags: Vec<String>,
    pub parent: Option<String>,
    pub depth: u32,
    pub can_spawn: bool,
    /// Base agent definition text from the manifest.
    pub definition: String,
    /// Optional mulch knowledge extract.
    pub knowledge: Option<String>,
    pub skip_scout: bool,
    /// Quality gates the agent must pass before reporting done.
    pub quality_gates: Vec<String>,
    pub tracker_cmd: String,
}

/// Infer domain tags from a file scope: top-level directories plus file
/// extensions, deduplicated and sorted.
pub fn infer_domains(file_scope: &[String]) -> Vec<String> {
    let mut tags = BTreeSet::new();
    for entry in file_scope {
        let path = Path::new(entry);
        let mut components = path.components();
        if let Some(first) = components.next() {
            let first = first.as_os_str().to_string_lossy();
            // a bare filename is not a directory tag
            if components.next().is_some() {
                tags.insert(first.into_owned());
            }
        }
        if let Some(ext) = path.extension() {
            tags.insert(ext.to_string_lossy().into_owned());
        }
    }
    tags.into_iter().collect()
}

/// Render the overlay markdown.
pub fn render(ctx: &OverlayContext) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# {} ({})\n\nYou are `{}`, an overstory-managed {} agent.\n\n",
        ctx.agent_name, ctx.capability, ctx.agent_name, ctx.capability
    ));

    out.push_str("## Assignment\n\n");
    if ctx.task_id.is_empty() {
        out.push_str("- Task: none (standing role)\n");
    } else {
        out.push_str(&format!("- Task: `{}`\n", ctx.task_id));
    }
    if let Some(spec) = &ctx.spec_path {
        out.push_str(&format!("- Spec: `{}`\n", spec.display()));
    }
    out.push_str(&format!("- Branch: `{}`\n", ctx.branch));
    out.push_str(&format!("- Worktree: `{}`\n", ctx.worktree_path.display()));
    out.push_str(&format!("- Depth: {}\n", ctx.depth));
    out.push_str(&format!(
        "- Parent: {}\n",
        ctx.parent.as_deref().unwrap_or("none")
    ));
    out.push('\n');

    if !ctx.file_scope.is_empty() {
        out.push_str("## File scope\n\nStay within:\n\n");
        for entry in &ctx.file_scope {
            out.push_str(&format!("- `{}`\n", entry));
        }
        out.push('\n');
    }

    if !ctx.domain_tags.is_empty() {
        out.push_str(&format!("Domains: {}\n\n", ctx.domain_tags.join(", ")));
    }

    out.push_str("## Role\n\n");
    out.push_str(&ctx.definition);
    out.push_str("\n\n");

    if ctx.can_spawn {
        out.push_str(
            "You may spawn child agents with `overstory sling`. \
             Never use native task or team tools.\n\n",
        );
    } else {
        out.push_str("You may not spawn child agents.\n\n");
    }

    if ctx.skip_scout {
        out.push_str("Scouting has been waived for this task; start building directly.\n\n");
    }

    if !ctx.quality_gates.is_empty() {
        out.push_str("## Quality gates\n\nBefore reporting done:\n\n");
        for gate in &ctx.quality_gates {
            out.push_str(&format!("- {}\n", gate));
        }
        out.push('\n');
    }

    out.push_str("## Protocol\n\n");
    out.push_str(&format!(
        "- Check mail: `overstory mail check --agent {}`\n",
        ctx.agent_name
    ));
    out.push_str(&format!(
        "- Report done: `overstory mail send --from {} --to {} --type worker_done`\n",
        ctx.agent_name,
        ctx.parent.as_deref().unwrap_or("coordinator")
    ));
    out.push_str(&format!("- Tracker: `{}`\n", ctx.tracker_cmd));
    out.push('\n');

    if let Some(knowledge) = &ctx.knowledge {
        out.push_str("## Domain knowledge\n\n");
        out.push_str(knowledge);
        out.push('\n');
    }

    out
}

/// Render and write the overlay into the worktree's sandbox directory.
pub fn deploy(ctx: &OverlayContext) -> Result<PathBuf, EngineError> {
    let claude_dir = ctx.worktree_path.join(".claude");
    std::fs::create_dir_all(&claude_dir).map_err(|e| {
        EngineError::for_agent(
            &ctx.agent_name,
            format!("failed to create {}: {e}", claude_dir.display()),
        )
    })?;
    let path = claude_dir.join("CLAUDE.md");
    std::fs::write(&path, render(ctx)).map_err(|e| {
        EngineError::for_agent(
            &ctx.agent_name,
            format!("failed to write {}: {e}", path.display()),
        )
    })?;
    Ok(path)
}

#[cfg(test)]
#[path = "overlay_tests.rs"]
mod tests;
