use crate::hook;
use crate::output::{print_json, print_text};
use recall_core::config::Config;
use recall_core::reader::{load_latest, SnapshotLoadResult};
use recall_core::report::{format_age, render, RenderOptions, Report};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = hook::load_config(root);
    let report = recover(root, &config);

    if json {
        print_json(&report)
    } else {
        print_text(&report.text)
    }
}

/// Load the latest snapshot and render it, logging anything the report hides.
pub fn recover(root: &Path, config: &Config) -> Report {
    let dir = config.snapshot_dir(root);
    let result = load_latest(&dir, config.recovery.freshness());

    match &result {
        SnapshotLoadResult::Found { snapshot, age } => tracing::debug!(
            timestamp = %snapshot.timestamp,
            "restoring snapshot from {}",
            format_age(*age)
        ),
        SnapshotLoadResult::Stale { age, .. } => tracing::info!(
            "latest snapshot is stale ({}, limit {}h)",
            format_age(*age),
            config.recovery.freshness_hours
        ),
        SnapshotLoadResult::Absent => {
            tracing::info!(dir = %dir.display(), "no session snapshot found")
        }
        SnapshotLoadResult::Corrupt { .. } => {}
    }

    let report = render(
        &result,
        &RenderOptions {
            interrupted_task: config.recovery.interrupted_task,
        },
    );
    if let Some(diagnostic) = &report.diagnostic {
        tracing::warn!("{diagnostic}");
    }
    report
}
