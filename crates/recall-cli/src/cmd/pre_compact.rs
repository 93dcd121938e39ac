use crate::hook;
use crate::output::{print_json, print_text};
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use recall_core::snapshot::{SessionSnapshot, Todo};
use recall_core::writer::write_snapshot;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PreCompactArgs {
    /// JSON file holding the current todo list (`[{"content", "status"}]`)
    #[arg(long)]
    pub todos: Option<PathBuf>,

    /// Name of the delegated agent currently at work
    #[arg(long)]
    pub agent: Option<String>,

    /// Path of the file most recently read
    #[arg(long = "last-file")]
    pub last_file: Option<String>,
}

pub fn run(root: &Path, args: PreCompactArgs, json: bool) -> anyhow::Result<()> {
    let config = hook::load_config(root);
    let mut snapshot = SessionSnapshot::capture(config.session_context(), Utc::now());

    if let Some(path) = &args.todos {
        match read_todos(path) {
            Ok(todos) => snapshot.todos = Some(todos),
            Err(e) => tracing::warn!("snapshot saved without todos: {e:#}"),
        }
    }
    snapshot.agent_in_progress = args.agent;
    snapshot.last_file_read = args.last_file;

    let handle = write_snapshot(&config.snapshot_dir(root), &snapshot)
        .context("failed to write session snapshot")?;
    tracing::info!(path = %handle.path.display(), "session snapshot written");

    if json {
        print_json(&handle)
    } else {
        print_text(&format!("Session snapshot saved: {}\n", handle.path.display()))
    }
}

fn read_todos(path: &Path) -> anyhow::Result<Vec<Todo>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid todo list in {}", path.display()))
}
