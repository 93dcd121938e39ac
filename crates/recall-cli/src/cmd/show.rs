use crate::output::{print_json, print_text};
use anyhow::Context;
use recall_core::config::Config;
use recall_core::paths;
use recall_core::reader::load_snapshot;
use recall_core::RecallError;
use std::path::Path;

/// Print a snapshot as JSON: the named file, or `latest.json`.
pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let dir = config.snapshot_dir(root);
    let path = match name {
        Some(name) => {
            if !is_plain_snapshot_name(name) {
                anyhow::bail!(
                    "invalid snapshot name '{name}': expected a snapshot_*.json file name from 'recall list'"
                );
            }
            dir.join(name)
        }
        None => paths::latest_path(&dir),
    };

    match load_snapshot(&path) {
        Ok(snapshot) => print_json(&snapshot),
        Err(RecallError::SnapshotNotFound(_)) => {
            print_text(&format!("No snapshot at {}.\n", path.display()))
        }
        Err(e) => Err(e).with_context(|| format!("failed to load {}", path.display())),
    }
}

/// A bare file name inside the snapshot directory; no separators or `..`.
fn is_plain_snapshot_name(name: &str) -> bool {
    paths::is_snapshot_filename(name)
        && !name.contains(|c: char| c == '/' || c == '\\')
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}
