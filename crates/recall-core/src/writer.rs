use crate::error::Result;
use crate::io;
use crate::paths;
use crate::snapshot::SessionSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a snapshot landed.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotHandle {
    pub path: PathBuf,
    pub latest: PathBuf,
    pub timestamp: DateTime<Utc>,
}

/// Persist `snapshot` into `dir`.
///
/// The timestamped file is created first and is never overwritten; then the
/// same bytes replace `latest.json`. If either step fails the error is
/// returned and `latest.json` still holds the previous snapshot intact.
pub fn write_snapshot(dir: &Path, snapshot: &SessionSnapshot) -> Result<SnapshotHandle> {
    io::ensure_dir(dir)?;
    let data = snapshot.to_json()?;

    let path = paths::snapshot_path(dir, &snapshot.timestamp);
    io::write_new(&path, data.as_bytes())?;

    let latest = paths::latest_path(dir);
    io::atomic_write(&latest, data.as_bytes())?;

    Ok(SnapshotHandle {
        path,
        latest,
        timestamp: snapshot.timestamp,
    })
}
