//! Recovery report rendering.
//!
//! [`render`] is pure: it turns a [`SnapshotLoadResult`] into text and never
//! fails. Anything other than a fresh snapshot renders [`FALLBACK_TEXT`].

use crate::reader::SnapshotLoadResult;
use crate::snapshot::{format_timestamp, InterruptedTask, SessionSnapshot, TodoTally};
use chrono::TimeDelta;
use serde::Serialize;

pub const FALLBACK_TEXT: &str = "\
=== SESSION CONTEXT REDUCED ===

No recent session snapshot is available.
Re-read the project instructions and the current todo list before continuing.
";

pub const RECOVERY_OPTIONS: [&str; 4] = [
    "Resume the interrupted task where it stopped",
    "Review the todo list and pick the next pending task",
    "Re-read the last file before making further edits",
    "Start fresh and ignore this snapshot",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub interrupted_task: InterruptedTask,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub outcome: &'static str,
    pub text: String,
    /// Operator-facing detail kept off the primary channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<TodoTally>,
}

impl Report {
    pub fn is_fallback(&self) -> bool {
        self.tally.is_none()
    }
}

pub fn render(result: &SnapshotLoadResult, opts: &RenderOptions) -> Report {
    match result {
        SnapshotLoadResult::Found { snapshot, age } => Report {
            outcome: result.label(),
            text: render_found(snapshot, *age, opts),
            diagnostic: None,
            tally: Some(snapshot.tally()),
        },
        SnapshotLoadResult::Corrupt { path, error } => Report {
            outcome: result.label(),
            text: FALLBACK_TEXT.to_string(),
            diagnostic: Some(format!(
                "session snapshot {} is unreadable: {}",
                path.display(),
                error
            )),
            tally: None,
        },
        SnapshotLoadResult::Stale { .. } | SnapshotLoadResult::Absent => Report {
            outcome: result.label(),
            text: FALLBACK_TEXT.to_string(),
            diagnostic: None,
            tally: None,
        },
    }
}

fn render_found(snap: &SessionSnapshot, age: TimeDelta, opts: &RenderOptions) -> String {
    let mut out = String::from("=== SESSION RECOVERED AFTER CONTEXT COMPACTION ===\n\n");
    out.push_str(&format!(
        "Snapshot: {} ({})\n",
        format_timestamp(&snap.timestamp),
        format_age(age)
    ));
    let project = snap.session_context.project.trim();
    if !project.is_empty() {
        out.push_str(&format!("Project: {project}\n"));
    }

    let tally = snap.tally();
    out.push_str(&format!(
        "\nTasks: {} completed, {} in progress, {} pending\n",
        tally.completed, tally.in_progress, tally.pending
    ));
    if let Some(task) = snap.interrupted_task(opts.interrupted_task) {
        let content = task.content.trim();
        if !content.is_empty() {
            out.push_str(&format!("Interrupted task: {content}\n"));
        }
    }
    if let Some(agent) = non_blank(&snap.agent_in_progress) {
        out.push_str(&format!("Agent in progress: {agent}\n"));
    }
    if let Some(file) = non_blank(&snap.last_file_read) {
        out.push_str(&format!("Last file read: {file}\n"));
    }

    let rules: Vec<&str> = snap
        .session_context
        .critical_rules
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();
    if !rules.is_empty() {
        out.push_str("\nCritical rules:\n");
        for rule in rules {
            out.push_str(&format!("  - {rule}\n"));
        }
    }

    out.push_str("\nRecovery options:\n");
    for (i, option) in RECOVERY_OPTIONS.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, option));
    }
    out
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Coarse human age: `just now`, `42s ago`, `3h 5m ago`, `2d 4h ago`.
pub fn format_age(age: TimeDelta) -> String {
    let secs = age.num_seconds();
    if secs <= 0 {
        return "just now".to_string();
    }
    let (days, hours, mins) = (secs / 86_400, (secs % 86_400) / 3600, (secs % 3600) / 60);
    if days > 0 {
        format!("{days}d {hours}h ago")
    } else if hours > 0 {
        format!("{hours}h {mins}m ago")
    } else if mins > 0 {
        format!("{mins}m ago")
    } else {
        format!("{secs}s ago")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
