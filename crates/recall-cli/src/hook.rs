//! Plumbing shared by the hook subcommands.
//!
//! Hooks drain stdin before anything else and never fail the host: every
//! error after the drain is logged to stderr and the process exits 0.

use anyhow::Context;
use recall_core::config::Config;
use std::io::{IsTerminal, Read};
use std::path::Path;

/// Read `input` to EOF and discard it. Returns the number of bytes drained.
pub fn drain<R: Read>(input: &mut R) -> std::io::Result<u64> {
    std::io::copy(input, &mut std::io::sink())
}

fn drain_stdin() -> std::io::Result<u64> {
    let stdin = std::io::stdin();
    // Interactive use: nobody is writing, so there is nothing to drain.
    if stdin.is_terminal() {
        return Ok(0);
    }
    drain(&mut stdin.lock())
}

/// Run one hook invocation behind a single error boundary.
///
/// Only a failed stdin drain escapes as an error.
pub fn run(name: &str, body: impl FnOnce() -> anyhow::Result<()>) -> anyhow::Result<()> {
    let drained = drain_stdin().context("failed to drain stdin")?;
    tracing::debug!(hook = name, bytes = drained, "stdin drained");

    if let Err(e) = body() {
        tracing::error!(hook = name, "{e:#}");
    }
    Ok(())
}

/// Project config for a hook. A broken config file degrades to defaults.
pub fn load_config(root: &Path) -> Config {
    match Config::load_or_default(root) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("ignoring unreadable config, using defaults: {e}");
            Config::for_root(root)
        }
    }
}
