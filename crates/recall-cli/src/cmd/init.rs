use crate::output::print_text;
use anyhow::Context;
use recall_core::config::Config;
use recall_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let created = !config_path.exists();
    if created {
        Config::for_root(root)
            .save(root)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
    }

    // Honor a pre-existing config's snapshot location.
    let config = Config::load(root).context("failed to load config")?;
    let snapshot_dir = config.snapshot_dir(root);
    io::ensure_dir(&snapshot_dir)
        .with_context(|| format!("failed to create {}", snapshot_dir.display()))?;

    let verb = if created { "Created" } else { "Using existing" };
    print_text(&format!(
        "{verb} {}\nSnapshots go to {}\n",
        config_path.display(),
        snapshot_dir.display()
    ))
}
