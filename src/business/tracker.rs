//! Main Tracker API
//!
//! This module provides the primary interface the view layer drives. A
//! `Tracker` owns the connection pool for one database file: it is opened at
//! startup and closed (drained) at shutdown.

use std::path::Path;
use crate::config::Config;
use crate::database::ConnectionPool;
use crate::error::{StorageError, Result};

/// Main tracker interface
pub struct Tracker {
    /// Connection pool, `None` once closed
    pub(crate) pool: Option<ConnectionPool>,
}

impl Tracker {
    /// Open (or create) a tracker database using `config`
    ///
    /// Pending schema migrations are applied before this returns.
    pub fn open(config: &Config) -> Result<Self> {
        let pool = ConnectionPool::open(config)?;
        Ok(Self { pool: Some(pool) })
    }

    /// Open (or create) a tracker database at `path` with default settings
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(&Config::new(path))
    }

    /// Close the tracker, draining every pooled connection
    ///
    /// Returns the number of connections closed. Calling it again is a no-op.
    pub fn close(&mut self) -> usize {
        self.pool.take().map(|pool| pool.drain()).unwrap_or(0)
    }

    /// Check if the tracker is open
    pub fn is_open(&self) -> bool {
        self.pool.is_some()
    }

    /// Get the connection pool
    pub fn pool(&self) -> Result<&ConnectionPool> {
        self.pool.as_ref().ok_or_else(|| {
            StorageError::Connection("Tracker is closed".to_string())
        })
    }

    /// Get the database path
    pub fn database_path(&self) -> Result<&Path> {
        Ok(self.pool()?.path())
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.close();
    }
}
