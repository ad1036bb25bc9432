//! Quote id generators
//!
//! Each repository instance issues ids strictly greater than every id it has
//! issued before, starting at 1.

use async_trait::async_trait;
use quotes_core::QuoteId;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::{Result, StorageError};

/// File name of the id counter inside a data directory
pub const LAST_ID_FILE: &str = "lastId.txt";

#[async_trait]
pub trait IdGenerator: Send + Sync {
    async fn next(&self) -> Result<QuoteId>;
}

/// Process-local counter, lost on restart
#[derive(Debug, Default)]
pub struct MemoryIdGenerator {
    last: AtomicI64,
}

impl MemoryIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdGenerator for MemoryIdGenerator {
    async fn next(&self) -> Result<QuoteId> {
        Ok(QuoteId(self.last.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

/// Counter persisted as a single plain-text integer.
///
/// The new value is written back before `next` returns; a failed write is
/// returned as an error and not retried.
#[derive(Debug, Clone)]
pub struct FileIdGenerator {
    path: PathBuf,
}

impl FileIdGenerator {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Counter stored as `lastId.txt` in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LAST_ID_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the counter holding `0` if it does not exist yet
    pub async fn ensure(&self) -> Result<()> {
        if !tokio::fs::try_exists(&self.path).await? {
            tokio::fs::write(&self.path, "0").await?;
        }
        Ok(())
    }

    /// Last issued id; an absent or blank counter reads as 0
    pub async fn last(&self) -> Result<i64> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed.parse::<i64>().map_err(|e| StorageError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Overwrite the last issued id
    pub async fn set_last(&self, id: i64) -> Result<()> {
        tokio::fs::write(&self.path, id.to_string()).await?;
        Ok(())
    }
}

#[async_trait]
impl IdGenerator for FileIdGenerator {
    async fn next(&self) -> Result<QuoteId> {
        let next = self.last().await? + 1;
        self.set_last(next).await?;
        Ok(QuoteId(next))
    }
}
