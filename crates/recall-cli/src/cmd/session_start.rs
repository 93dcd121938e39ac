use crate::cmd::post_compact::recover;
use crate::hook;
use crate::output::{print_json, print_text};
use recall_core::digest::Digest;
use recall_core::report::Report;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct SessionStartOutput {
    report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<Digest>,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = hook::load_config(root);
    let report = recover(root, &config);

    let path = config.instructions_path(root);
    let digest = match Digest::load(&path, &config.instructions) {
        Ok(d) if !d.is_empty() => Some(d),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("skipping digest of {}: {e}", path.display());
            None
        }
    };

    if json {
        return print_json(&SessionStartOutput { report, digest });
    }

    let mut text = report.text;
    if let Some(digest) = digest {
        let source = config.instructions.path.display().to_string();
        text.push('\n');
        text.push_str(&digest.render(&source));
    }
    print_text(&text)
}
