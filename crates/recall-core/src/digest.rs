//! Session-start digest of the project instructions file.
//!
//! A small line-oriented state machine walks the markdown and captures the
//! sections whose headings match the configured titles. Matching is by exact
//! title (case-insensitive, trailing colon ignored): a renamed heading in the
//! instructions file drops its section from the digest.

use crate::config::InstructionsConfig;
use crate::error::Result;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    CriticalRules,
    Deployment,
    Workflow,
}

impl Section {
    pub fn all() -> [Section; 3] {
        [Section::CriticalRules, Section::Deployment, Section::Workflow]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    /// Inside a captured section opened by a heading of `level`.
    In { section: Section, level: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestSection {
    pub section: Section,
    /// Heading text as written in the file.
    pub title: String,
    pub lines: Vec<String>,
    /// Non-blank lines dropped by the per-section cap.
    pub truncated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub sections: Vec<DigestSection>,
}

static HEADING_RE: OnceLock<Regex> = OnceLock::new();
static FENCE_RE: OnceLock<Regex> = OnceLock::new();

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").unwrap())
}

fn fence_re() -> &'static Regex {
    FENCE_RE.get_or_init(|| Regex::new(r"^\s*(`{3,}|~{3,})").unwrap())
}

/// Whether `line` (whose fence run is `marker`) closes a block opened by
/// `open`: same fence character, at least as long, nothing after it.
fn closes_fence(open: &str, marker: &str, line: &str) -> bool {
    marker.as_bytes().first() == open.as_bytes().first()
        && marker.len() >= open.len()
        && line.trim().len() == marker.len()
}

fn normalize(title: &str) -> String {
    title.trim().trim_end_matches(':').trim().to_lowercase()
}

impl Digest {
    /// A missing file yields an empty digest.
    pub fn load(path: &Path, cfg: &InstructionsConfig) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text, cfg)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(text: &str, cfg: &InstructionsConfig) -> Self {
        let classify = |title: &str| -> Option<Section> {
            let title = normalize(title);
            let h = &cfg.headings;
            Section::all().into_iter().find(|s| {
                let titles = match s {
                    Section::CriticalRules => &h.critical_rules,
                    Section::Deployment => &h.deployment,
                    Section::Workflow => &h.workflow,
                };
                titles.iter().any(|t| normalize(t) == title)
            })
        };

        let mut digest = Digest::default();
        let mut state = State::Outside;
        // The run that opened the current code block, if inside one.
        let mut fence: Option<String> = None;

        for line in text.lines() {
            if let Some(caps) = fence_re().captures(line) {
                let marker = &caps[1];
                fence = match fence.take() {
                    None => Some(marker.to_string()),
                    Some(open) if closes_fence(&open, marker, line) => None,
                    Some(open) => Some(open),
                };
            } else if fence.is_none() {
                if let Some(caps) = heading_re().captures(line) {
                    let level = caps[1].len();
                    let title = &caps[2];
                    state = match (classify(title), state) {
                        (Some(section), _) => {
                            digest.open(section, title);
                            State::In { section, level }
                        }
                        // Subheadings stay inside the enclosing section.
                        (None, State::In { section, level: open }) if level > open => {
                            digest.push(section, line.trim(), cfg.max_lines);
                            continue;
                        }
                        (None, _) => State::Outside,
                    };
                    continue;
                }
            }

            if let State::In { section, .. } = state {
                let line = line.trim_end();
                if !line.trim().is_empty() {
                    digest.push(section, line, cfg.max_lines);
                }
            }
        }
        digest
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.lines.is_empty())
    }

    pub fn get(&self, section: Section) -> Option<&DigestSection> {
        self.sections.iter().find(|s| s.section == section)
    }

    fn open(&mut self, section: Section, title: &str) {
        if self.get(section).is_none() {
            self.sections.push(DigestSection {
                section,
                title: title.trim().to_string(),
                lines: Vec::new(),
                truncated: 0,
            });
        }
    }

    fn push(&mut self, section: Section, line: &str, max_lines: usize) {
        if let Some(s) = self.sections.iter_mut().find(|s| s.section == section) {
            if s.lines.len() < max_lines {
                s.lines.push(line.to_string());
            } else {
                s.truncated += 1;
            }
        }
    }

    pub fn render(&self, source: &str) -> String {
        let mut out = format!("Project reminders (from {source}):\n");
        for s in self.sections.iter().filter(|s| !s.lines.is_empty()) {
            out.push_str(&format!("\n{}\n", s.title));
            for line in &s.lines {
                out.push_str(&format!("  {line}\n"));
            }
            if s.truncated > 0 {
                out.push_str(&format!("  ... ({} more lines in {source})\n", s.truncated));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
