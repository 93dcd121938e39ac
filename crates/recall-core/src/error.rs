use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecallError {
    #[error("not initialized: run 'recall init'")]
    NotInitialized,

    #[error("snapshot already exists: {0}")]
    SnapshotExists(String),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("invalid timestamp '{0}': expected RFC 3339 or ISO-8601 local time")]
    InvalidTimestamp(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecallError>;
