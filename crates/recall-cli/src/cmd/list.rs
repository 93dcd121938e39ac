use crate::output::{print_json, print_table, print_text};
use anyhow::Context;
use recall_core::config::Config;
use recall_core::reader::list_snapshots;
use recall_core::snapshot::format_timestamp;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let dir = config.snapshot_dir(root);
    let entries = list_snapshots(&dir).context("failed to list snapshots")?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        return print_text(&format!("No snapshots in {}.\n", dir.display()));
    }

    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.name.clone(),
                e.timestamp
                    .as_ref()
                    .map(format_timestamp)
                    .unwrap_or_else(|| "unreadable".to_string()),
                e.size.to_string(),
            ]
        })
        .collect();
    print_table(&["SNAPSHOT", "TIMESTAMP", "BYTES"], rows)
}
