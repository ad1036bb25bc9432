//! Storage configuration
//!
//! Loaded from a YAML file, with environment overrides for the backend and paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown storage backend: {0}")]
    UnknownBackend(String),
}

/// Which repository implementation to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Process-local map, nothing persisted
    #[default]
    Memory,
    /// One JSON unit per quote in `data_dir`
    FilePerRecord,
    /// Whole collection in `data_dir/data.json`, cached in memory
    Consolidated,
    /// One row per quote in a SQLite table
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::FilePerRecord => "file-per-record",
            BackendKind::Consolidated => "consolidated",
            BackendKind::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(BackendKind::Memory),
            "file" | "file-per-record" => Ok(BackendKind::FilePerRecord),
            "consolidated" | "cached-file" => Ok(BackendKind::Consolidated),
            "sqlite" | "db" => Ok(BackendKind::Sqlite),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to open
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory of the file backends
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Table holding one row per quote
    #[serde(default = "default_table")]
    pub table: String,

    /// How many quotes the consolidated backend's `find_all` returns
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Placeholder quotes written when the consolidated unit starts out empty
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("db/wiseSaying")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("db/quotes.sqlite3")
}

fn default_table() -> String {
    "say".to_string()
}

fn default_recent_limit() -> usize {
    5
}

fn default_seed_count() -> usize {
    10
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
            db_path: default_db_path(),
            table: default_table(),
            recent_limit: default_recent_limit(),
            seed_count: default_seed_count(),
        }
    }
}

impl StorageConfig {
    pub fn with_backend(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Read a YAML config file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply `QUOTES_BACKEND`, `QUOTES_DATA_DIR` and `QUOTES_DB_PATH` from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = non_empty("QUOTES_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(dir) = non_empty("QUOTES_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(db) = non_empty("QUOTES_DB_PATH") {
            self.db_path = PathBuf::from(db);
        }
        Ok(self)
    }
}
