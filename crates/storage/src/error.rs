//! Storage errors
//!
//! Only infrastructure failures are errors here. A missing record is reported
//! through `Option`, never through `StorageError`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Malformed data in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Lock failed: {0}")]
    LockFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
