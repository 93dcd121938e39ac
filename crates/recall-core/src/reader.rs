use crate::error::{RecallError, Result};
use crate::paths;
use crate::snapshot::SessionSnapshot;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub fn default_freshness() -> TimeDelta {
    TimeDelta::hours(24)
}

// ---------------------------------------------------------------------------
// SnapshotLoadResult
// ---------------------------------------------------------------------------

/// Outcome of reading `latest.json`. Every variant is an expected outcome;
/// only `Found` carries content worth rendering.
#[derive(Debug)]
pub enum SnapshotLoadResult {
    Found {
        snapshot: SessionSnapshot,
        age: TimeDelta,
    },
    Stale {
        snapshot: SessionSnapshot,
        age: TimeDelta,
    },
    Absent,
    Corrupt {
        path: PathBuf,
        error: RecallError,
    },
}

impl SnapshotLoadResult {
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotLoadResult::Found { .. } => "found",
            SnapshotLoadResult::Stale { .. } => "stale",
            SnapshotLoadResult::Absent => "absent",
            SnapshotLoadResult::Corrupt { .. } => "corrupt",
        }
    }

    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        match self {
            SnapshotLoadResult::Found { snapshot, .. }
            | SnapshotLoadResult::Stale { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    pub fn age(&self) -> Option<TimeDelta> {
        match self {
            SnapshotLoadResult::Found { age, .. } | SnapshotLoadResult::Stale { age, .. } => {
                Some(*age)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_latest(dir: &Path, freshness: TimeDelta) -> SnapshotLoadResult {
    load_latest_at(dir, freshness, Utc::now())
}

/// [`load_latest`] against an explicit clock.
pub fn load_latest_at(dir: &Path, freshness: TimeDelta, now: DateTime<Utc>) -> SnapshotLoadResult {
    let path = paths::latest_path(dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return SnapshotLoadResult::Absent;
        }
        Err(e) => {
            return SnapshotLoadResult::Corrupt {
                path,
                error: e.into(),
            };
        }
    };
    match SessionSnapshot::from_json(&data) {
        Ok(snapshot) => classify(snapshot, freshness, now),
        Err(error) => SnapshotLoadResult::Corrupt { path, error },
    }
}

/// `age <= freshness` is fresh. A timestamp in the future counts as fresh.
pub fn classify(
    snapshot: SessionSnapshot,
    freshness: TimeDelta,
    now: DateTime<Utc>,
) -> SnapshotLoadResult {
    let age = now - snapshot.timestamp;
    if age <= freshness {
        SnapshotLoadResult::Found { snapshot, age }
    } else {
        SnapshotLoadResult::Stale { snapshot, age }
    }
}

pub fn load_snapshot(path: &Path) -> Result<SessionSnapshot> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecallError::SnapshotNotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    SessionSnapshot::from_json(&data)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub path: PathBuf,
    /// `None` when the file does not parse.
    pub timestamp: Option<DateTime<Utc>>,
    pub size: u64,
}

/// Timestamped snapshots in `dir`, newest first. A missing directory has none.
pub fn list_snapshots(dir: &Path) -> Result<Vec<SnapshotEntry>> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !paths::is_snapshot_filename(&name) || !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let size = entry.metadata()?.len();
        let timestamp = load_snapshot(&path).ok().map(|s| s.timestamp);
        entries.push(SnapshotEntry {
            name,
            path,
            timestamp,
            size,
        });
    }
    // Filenames embed a fixed-width UTC timestamp, so name order is time order.
    entries.sort_by(|a, b| b.name.cmp(&a.name));
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
