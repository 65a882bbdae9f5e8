//! Connection pool for the database file
//!
//! Connections are reused instead of reopened per call. The pool has no upper
//! bound: when every handle is checked out, `acquire` opens another one, and
//! that handle joins the idle queue once it is released.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use rusqlite::Connection;
use tracing::{debug, warn};
use crate::config::Config;
use crate::error::{StorageError, Result};
use super::migrations;

/// Pool of reusable connections to one database file
pub struct ConnectionPool {
    /// Settings applied to every connection
    config: Config,
    /// Connections waiting to be reused
    idle: Mutex<VecDeque<Connection>>,
    /// Total connections opened over the pool's lifetime
    opened: AtomicUsize,
    /// Liveness check run on every released connection
    health_check: fn(&Connection) -> bool,
}

impl ConnectionPool {
    /// Open a pool and bring the schema up to date
    ///
    /// The first connection runs the migrations and is kept for reuse.
    pub fn open(config: &Config) -> Result<Self> {
        let conn = open_connection(config)?;
        let applied = migrations::migrate(&conn)?;
        debug!(
            path = %config.database_path.display(),
            migrations = applied,
            "connection pool opened"
        );

        Ok(Self {
            config: config.clone(),
            idle: Mutex::new(VecDeque::from([conn])),
            opened: AtomicUsize::new(1),
            health_check: is_healthy,
        })
    }

    /// Replace the liveness check run on release
    #[cfg(test)]
    fn with_health_check(mut self, check: fn(&Connection) -> bool) -> Self {
        self.health_check = check;
        self
    }

    /// Take an idle connection, or open a new one, and begin a transaction
    pub fn acquire(&self) -> Result<PooledConnection<'_>> {
        let reused = self.lock_idle().pop_front();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                let conn = open_connection(&self.config)?;
                let total = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(total, "opened additional pooled connection");
                conn
            }
        };

        // Usually SQLITE_BUSY; the handle itself is still fine to reuse.
        if let Err(err) = conn.execute_batch("BEGIN IMMEDIATE") {
            warn!(error = %err, "could not begin transaction");
            self.release(conn);
            return Err(err.into());
        }

        Ok(PooledConnection {
            pool: self,
            conn: Some(conn),
        })
    }

    /// Run one unit of work on a pooled connection
    ///
    /// Commits when `f` succeeds and rolls back when it fails. The connection
    /// goes back to the pool either way.
    pub fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let pooled = self.acquire()?;
        let result = f(pooled.connection()?);
        match result {
            Ok(value) => {
                pooled.commit()?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "unit of work failed, rolling back");
                if let Err(rollback_err) = pooled.rollback() {
                    warn!(error = %rollback_err, "rollback after failed unit of work failed");
                }
                Err(err)
            }
        }
    }

    /// Close every idle connection
    ///
    /// Returns the number closed. Safe to call repeatedly.
    pub fn drain(&self) -> usize {
        let conns: Vec<Connection> = self.lock_idle().drain(..).collect();
        let count = conns.len();
        for conn in conns {
            if let Err((_, err)) = conn.close() {
                warn!(error = %err, "failed to close pooled connection");
            }
        }
        if count > 0 {
            debug!(count, "connection pool drained");
        }
        count
    }

    /// Number of connections waiting to be reused
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    /// Total connections opened since the pool was created
    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.config.database_path
    }

    /// Return a connection to the idle queue
    ///
    /// Any open transaction is rolled back first. A handle that fails the
    /// liveness check is discarded.
    fn release(&self, conn: Connection) {
        if !conn.is_autocommit() {
            if let Err(err) = conn.execute_batch("ROLLBACK") {
                warn!(error = %err, "rollback on release failed");
            }
        }

        if (self.health_check)(&conn) {
            self.lock_idle().push_back(conn);
        } else {
            warn!("discarding unusable pooled connection");
        }
    }

    fn lock_idle(&self) -> MutexGuard<'_, VecDeque<Connection>> {
        // The queue holds no invariant a panicking holder could break.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        self.drain();
    }
}

/// A connection checked out of the pool, inside a transaction
///
/// Dropping the guard without calling [`commit`](Self::commit) rolls the
/// transaction back and returns the connection to the pool.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<Connection>,
}

impl PooledConnection<'_> {
    /// Get a reference to the connection
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            StorageError::Connection("Connection already released".to_string())
        })
    }

    /// Commit the transaction and release the connection
    pub fn commit(self) -> Result<()> {
        self.connection()?.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Roll back the transaction and release the connection
    ///
    /// A no-op if SQLite already ended the transaction on its own, as it
    /// does after `OR ROLLBACK` conflicts and some I/O errors.
    pub fn rollback(self) -> Result<()> {
        let conn = self.connection()?;
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

/// Open and configure a single connection
fn open_connection(config: &Config) -> Result<Connection> {
    let conn = Connection::open(&config.database_path)?;
    conn.busy_timeout(config.busy_timeout())?;
    conn.execute_batch(if config.foreign_keys {
        "PRAGMA foreign_keys = ON"
    } else {
        "PRAGMA foreign_keys = OFF"
    })?;
    let mode: String = conn.query_row(
        &format!("PRAGMA journal_mode = {}", config.journal_mode.as_pragma()),
        [],
        |row| row.get(0),
    )?;
    debug!(path = %config.database_path.display(), journal_mode = %mode, "opened connection");
    Ok(conn)
}

/// Cheap liveness probe
fn is_healthy(conn: &Connection) -> bool {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn create_test_pool() -> (ConnectionPool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(temp_dir.path().join("test.db"));
        let pool = ConnectionPool::open(&config).unwrap();
        (pool, temp_dir)
    }

    fn theme_count(pool: &ConnectionPool) -> i64 {
        pool.run(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM themes", [], |row| row.get(0))?)
        }).unwrap()
    }

    #[test]
    fn test_open_runs_migrations() {
        let (pool, _temp) = create_test_pool();
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.opened_count(), 1);
        assert_eq!(theme_count(&pool), 0);
    }

    #[test]
    fn test_open_unreachable_path() {
        let config = Config::new("/nonexistent/dir/test.db");
        let result = ConnectionPool::open(&config);
        assert!(matches!(result, Err(StorageError::Connection(_))));
    }

    #[test]
    fn test_connection_is_reused() {
        let (pool, _temp) = create_test_pool();
        for _ in 0..5 {
            theme_count(&pool);
        }
        assert_eq!(pool.opened_count(), 1);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_acquire_checks_out_idle_connection() {
        let (pool, _temp) = create_test_pool();

        let first = pool.acquire().unwrap();
        assert_eq!(pool.idle_count(), 0);
        first.commit().unwrap();

        let first = pool.acquire().unwrap();
        first.rollback().unwrap();
        assert_eq!(pool.opened_count(), 1);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_failed_unit_is_rolled_back_and_released() {
        let (pool, _temp) = create_test_pool();

        let result: Result<()> = pool.run(|conn| {
            conn.execute("INSERT INTO themes (created_on, name, name_key) VALUES (0, 'study', 'study')", [])?;
            Err(StorageError::Validation("forced failure".to_string()))
        });
        assert!(matches!(result, Err(StorageError::Validation(_))));

        // Not leaked, and the write is gone
        assert_eq!(pool.idle_count(), 1);
        let conn = pool.acquire().unwrap();
        let count: i64 = conn.connection().unwrap()
            .query_row("SELECT COUNT(*) FROM themes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        drop(conn);
        assert_eq!(pool.opened_count(), 1);
    }

    #[test]
    fn test_dropped_guard_rolls_back() {
        let (pool, _temp) = create_test_pool();
        {
            let conn = pool.acquire().unwrap();
            conn.connection().unwrap()
                .execute("INSERT INTO themes (created_on, name, name_key) VALUES (0, 'study', 'study')", [])
                .unwrap();
        }
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(theme_count(&pool), 0);
    }

    #[test]
    fn test_committed_unit_is_visible() {
        let (pool, _temp) = create_test_pool();
        pool.run(|conn| {
            conn.execute("INSERT INTO themes (created_on, name, name_key) VALUES (0, 'study', 'study')", [])?;
            Ok(())
        }).unwrap();
        assert_eq!(theme_count(&pool), 1);
    }

    #[test]
    fn test_engine_rollback_keeps_original_error() {
        let (pool, _temp) = create_test_pool();
        pool.run(|conn| {
            conn.execute("INSERT INTO themes (created_on, name, name_key) VALUES (0, 'a', 'a')", [])?;
            Ok(())
        }).unwrap();

        // OR ROLLBACK ends the transaction inside SQLite before `run` sees the error
        let result: Result<()> = pool.run(|conn| {
            conn.execute(
                "INSERT OR ROLLBACK INTO themes (created_on, name, name_key) VALUES (0, 'a', 'a')",
                [],
            )?;
            Ok(())
        });
        assert!(matches!(result, Err(StorageError::Constraint(_))));

        assert_eq!(pool.idle_count(), 1);
        assert_eq!(theme_count(&pool), 1);
    }

    #[test]
    fn test_unhealthy_connection_is_discarded() {
        let (pool, _temp) = create_test_pool();
        let pool = pool.with_health_check(|_| false);

        assert_eq!(theme_count(&pool), 0);
        assert_eq!(pool.idle_count(), 0);

        // The next unit opens a replacement
        assert_eq!(theme_count(&pool), 0);
        assert_eq!(pool.opened_count(), 2);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_busy_begin_requeues_connection() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(temp_dir.path().join("test.db"));
        config.busy_timeout_ms = 0;
        let holder = ConnectionPool::open(&config).unwrap();
        let waiter = ConnectionPool::open(&config).unwrap();

        let guard = holder.acquire().unwrap();
        let result = waiter.acquire();
        assert!(matches!(result, Err(StorageError::Database(_))));
        assert_eq!(waiter.idle_count(), 1);
        drop(guard);

        let conn = waiter.acquire().unwrap();
        conn.commit().unwrap();
        assert_eq!(waiter.opened_count(), 1);
    }

    #[test]
    fn test_drain_is_idempotent() {
        let (pool, _temp) = create_test_pool();
        assert_eq!(pool.drain(), 1);
        assert_eq!(pool.drain(), 0);
        assert_eq!(pool.idle_count(), 0);

        // Acquire after drain reopens
        assert_eq!(theme_count(&pool), 0);
        assert_eq!(pool.opened_count(), 2);
    }

    #[test]
    fn test_concurrent_callers() {
        let (pool, _temp) = create_test_pool();
        let pool = Arc::new(pool);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    pool.run(|conn| {
                        let name = format!("theme-{}", i);
                        conn.execute(
                            "INSERT INTO themes (created_on, name, name_key) VALUES (0, ?1, ?1)",
                            [name],
                        )?;
                        Ok(())
                    }).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(theme_count(&pool), 4);
        assert!(pool.opened_count() >= 1);
        assert_eq!(pool.idle_count(), pool.opened_count());
    }
}
