use crate::error::{RecallError, Result};
use crate::paths;
use crate::snapshot::{InterruptedTask, SessionContext};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ContextConfig
// ---------------------------------------------------------------------------

/// Static reminder content copied into every snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub critical_rules: Vec<String>,
    #[serde(default)]
    pub deployment: BTreeMap<String, String>,
    #[serde(default)]
    pub workflow: Vec<String>,
}

// ---------------------------------------------------------------------------
// RecoveryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Snapshots older than this are treated as stale.
    #[serde(default = "default_freshness_hours")]
    pub freshness_hours: u32,
    #[serde(default)]
    pub interrupted_task: InterruptedTask,
}

fn default_freshness_hours() -> u32 {
    24
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            freshness_hours: default_freshness_hours(),
            interrupted_task: InterruptedTask::default(),
        }
    }
}

impl RecoveryConfig {
    pub fn freshness(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.freshness_hours))
    }
}

// ---------------------------------------------------------------------------
// InstructionsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHeadings {
    #[serde(default = "default_rules_heading")]
    pub critical_rules: Vec<String>,
    #[serde(default = "default_deployment_heading")]
    pub deployment: Vec<String>,
    #[serde(default = "default_workflow_heading")]
    pub workflow: Vec<String>,
}

fn default_rules_heading() -> Vec<String> {
    vec!["Critical Rules".to_string()]
}

fn default_deployment_heading() -> Vec<String> {
    vec!["Deployment".to_string()]
}

fn default_workflow_heading() -> Vec<String> {
    vec!["Workflow".to_string()]
}

impl Default for SectionHeadings {
    fn default() -> Self {
        Self {
            critical_rules: default_rules_heading(),
            deployment: default_deployment_heading(),
            workflow: default_workflow_heading(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionsConfig {
    #[serde(default = "default_instructions_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default)]
    pub headings: SectionHeadings,
}

fn default_instructions_path() -> PathBuf {
    PathBuf::from(paths::INSTRUCTIONS_MD)
}

fn default_max_lines() -> usize {
    8
}

impl Default for InstructionsConfig {
    fn default() -> Self {
        Self {
            path: default_instructions_path(),
            max_lines: default_max_lines(),
            headings: SectionHeadings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SnapshotsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotsConfig {
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(paths::SNAPSHOTS_DIR)
}

impl Default for SnapshotsConfig {
    fn default() -> Self {
        Self {
            dir: default_snapshot_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub instructions: InstructionsConfig,
    #[serde(default)]
    pub snapshots: SnapshotsConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
            },
            context: ContextConfig::default(),
            recovery: RecoveryConfig::default(),
            instructions: InstructionsConfig::default(),
            snapshots: SnapshotsConfig::default(),
        }
    }

    /// Defaults for a project that has no config file, named after `root`.
    pub fn for_root(root: &Path) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RecallError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        // An empty file is valid YAML `null`; treat it as all defaults.
        if data.trim().is_empty() {
            return Ok(Self::for_root(root));
        }
        let mut cfg: Config = serde_yaml::from_str(&data)?;
        if cfg.project.name.is_empty() {
            cfg.project.name = Self::for_root(root).project.name;
        }
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file yields defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(RecallError::NotInitialized) => Ok(Self::for_root(root)),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            project: self.project.name.clone(),
            critical_rules: self.context.critical_rules.clone(),
            deployment: self.context.deployment.clone(),
            workflow: self.context.workflow.clone(),
        }
    }

    pub fn snapshot_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.snapshots.dir)
    }

    pub fn instructions_path(&self, root: &Path) -> PathBuf {
        root.join(&self.instructions.path)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "project.name is empty".to_string(),
            });
        }

        if self.recovery.freshness_hours == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "recovery.freshness_hours is 0: every snapshot will be stale"
                    .to_string(),
            });
        }

        if self.instructions.max_lines == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "instructions.max_lines is 0: the session-start digest will be empty"
                    .to_string(),
            });
        }

        // A heading claimed by two sections is only ever routed to the first.
        let headings = &self.instructions.headings;
        let sections = [
            ("critical_rules", &headings.critical_rules),
            ("deployment", &headings.deployment),
            ("workflow", &headings.workflow),
        ];
        for (i, (name, titles)) in sections.iter().enumerate() {
            for (other, other_titles) in &sections[i + 1..] {
                for title in titles.iter() {
                    if other_titles
                        .iter()
                        .any(|t| t.trim().eq_ignore_ascii_case(title.trim()))
                    {
                        warnings.push(ConfigWarning {
                            level: WarnLevel::Warning,
                            message: format!(
                                "heading '{}' is listed under both {} and {}",
                                title, name, other
                            ),
                        });
                    }
                }
            }
        }

        if self.snapshots.dir.is_absolute() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "snapshots.dir '{}' is absolute: snapshots are shared across projects",
                    self.snapshots.dir.display()
                ),
            });
        }

        for (key, value) in &self.context.deployment {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("context.deployment.{} is empty", key),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
