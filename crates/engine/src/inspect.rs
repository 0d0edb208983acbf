// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inspection helpers over the event log.

use overstory_core::{AgentEvent, EventType};

/// Tools whose arguments name the file being worked on.
const FILE_TOOLS: [&str; 3] = ["Edit", "Write", "Read"];

/// Argument fields that carry a path, in lookup order.
const PATH_FIELDS: [&str; 3] = ["file_path", "path", "notebook_path"];

/// Derive the "current file" for rendering: scan the most recent
/// `tool_start` events backwards for a file-handling tool whose arguments
/// carry a recognizable path field.
pub fn derive_current_file(events: &[AgentEvent]) -> Option<String> {
    events.iter().rev().find_map(|event| {
        if event.event_type != EventType::ToolStart {
            return None;
        }
        let tool = event.tool_name.as_deref()?;
        if !FILE_TOOLS.contains(&tool) {
            return None;
        }
        let args: serde_json::Value = serde_json::from_str(event.tool_args.as_deref()?).ok()?;
        PATH_FIELDS
            .iter()
            .find_map(|field| args.get(field).and_then(|v| v.as_str()))
            .map(str::to_string)
    })
}

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod tests;
