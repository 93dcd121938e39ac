use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const RECALL_DIR: &str = ".recall";
pub const SNAPSHOTS_DIR: &str = ".recall/snapshots";
pub const CONFIG_FILE: &str = ".recall/config.yaml";

pub const INSTRUCTIONS_MD: &str = "CLAUDE.md";

pub const LATEST_FILE: &str = "latest.json";
pub const SNAPSHOT_PREFIX: &str = "snapshot_";
pub const SNAPSHOT_EXT: &str = ".json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn latest_path(snapshot_dir: &Path) -> PathBuf {
    snapshot_dir.join(LATEST_FILE)
}

/// `snapshot_2026-10-18T09-15-02.123456Z.json`: the RFC 3339 form with every
/// colon replaced so the name is valid on every filesystem.
pub fn snapshot_filename(timestamp: &DateTime<Utc>) -> String {
    let stamp = timestamp
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
        .replace(':', "-");
    format!("{SNAPSHOT_PREFIX}{stamp}{SNAPSHOT_EXT}")
}

pub fn snapshot_path(snapshot_dir: &Path, timestamp: &DateTime<Utc>) -> PathBuf {
    snapshot_dir.join(snapshot_filename(timestamp))
}

pub fn is_snapshot_filename(name: &str) -> bool {
    name.starts_with(SNAPSHOT_PREFIX)
        && name.ends_with(SNAPSHOT_EXT)
        && name.len() > SNAPSHOT_PREFIX.len() + SNAPSHOT_EXT.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
