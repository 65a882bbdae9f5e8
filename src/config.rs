//! Storage configuration
//!
//! A [`Config`] can be built in code or loaded from a JSON document. Keys
//! missing from the document fall back to their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use crate::error::{StorageError, Result};
use crate::{DATABASE_FILENAME, DEFAULT_BUSY_TIMEOUT_MS};

/// SQLite journal mode applied to every pooled connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Write-ahead log
    Wal,
    /// Rollback journal, deleted after each transaction
    Delete,
}

impl JournalMode {
    /// Pragma value for this mode
    pub fn as_pragma(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Enforce foreign keys on every connection
    pub foreign_keys: bool,
    /// How long a connection waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
    /// Journal mode
    pub journal_mode: JournalMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DATABASE_FILENAME),
            foreign_keys: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: JournalMode::Wal,
        }
    }
}

impl Config {
    /// Default configuration for a database at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| StorageError::Config(e.to_string()))
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Busy timeout as a [`Duration`]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
