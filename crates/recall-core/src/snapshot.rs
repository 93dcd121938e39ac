use crate::error::{RecallError, Result};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// The fixed-shape context captured with every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub critical_rules: Vec<String>,
    #[serde(default, alias = "deployment_info")]
    pub deployment: BTreeMap<String, String>,
    #[serde(default, alias = "workflow_steps")]
    pub workflow: Vec<String>,
}

// ---------------------------------------------------------------------------
// Todo / TodoStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
    /// Anything the writer did not know about. Never counted.
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TodoStatus::Pending => "pending",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Completed => "completed",
            TodoStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: TodoStatus,
}

impl Todo {
    pub fn new(content: impl Into<String>, status: TodoStatus) -> Self {
        Self {
            content: content.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodoTally {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TodoTally {
    pub fn count(todos: &[Todo]) -> Self {
        let mut tally = Self::default();
        for todo in todos {
            match todo.status {
                TodoStatus::Pending => tally.pending += 1,
                TodoStatus::InProgress => tally.in_progress += 1,
                TodoStatus::Completed => tally.completed += 1,
                TodoStatus::Unknown => {}
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed
    }
}

/// Which `in_progress` todo names the interrupted task when several exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptedTask {
    #[default]
    First,
    Last,
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// Everything beyond `timestamp` and `session_context` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub session_context: SessionContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todos: Option<Vec<Todo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_in_progress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_file_read: Option<String>,
}

impl SessionSnapshot {
    /// The timestamp is truncated to the microseconds the file format keeps.
    pub fn capture(session_context: SessionContext, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(6),
            session_context,
            todos: None,
            agent_in_progress: None,
            last_file_read: None,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        self.todos.as_deref().unwrap_or(&[])
    }

    pub fn tally(&self) -> TodoTally {
        TodoTally::count(self.todos())
    }

    pub fn interrupted_task(&self, pick: InterruptedTask) -> Option<&Todo> {
        let mut in_progress = self
            .todos()
            .iter()
            .filter(|t| t.status == TodoStatus::InProgress);
        match pick {
            InterruptedTask::First => in_progress.next(),
            InterruptedTask::Last => in_progress.last(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        Ok(data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse a snapshot timestamp.
///
/// RFC 3339 with an offset is preferred. Naive ISO-8601 values (no offset)
/// are read as local time.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }
    Err(RecallError::InvalidTimestamp(s.to_string()))
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
