//! Versioned schema migrations
//!
//! The applied version lives in `PRAGMA user_version`. Each step runs at most
//! once; an up-to-date database is left untouched.

use std::collections::HashSet;
use rusqlite::{Connection, params};
use tracing::{debug, warn};
use crate::error::{StorageError, Result};
use crate::utils::name_key;
use super::schema;

/// Current schema version
pub const CURRENT_VERSION: u32 = 3;

/// Bring the database up to [`CURRENT_VERSION`]
///
/// Returns the number of steps applied.
pub fn migrate(conn: &Connection) -> Result<u32> {
    let version = get_database_version(conn)?;

    if !is_version_compatible(version) {
        return Err(StorageError::InvalidVersion(version.to_string()));
    }
    if version == CURRENT_VERSION {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    if version < 1 {
        upgrade_to_v1(&tx)?;
    }
    if version < 2 {
        upgrade_to_v2(&tx)?;
    }
    if version < 3 {
        upgrade_to_v3(&tx)?;
    }
    set_database_version(&tx, CURRENT_VERSION)?;
    tx.commit()?;

    debug!(from = version, to = CURRENT_VERSION, "database migrated");
    Ok(CURRENT_VERSION - version)
}

/// v1: themes, types and data tables
fn upgrade_to_v1(conn: &Connection) -> Result<()> {
    for sql in schema::CREATE_ALL_TABLES {
        conn.execute(sql, [])?;
    }
    Ok(())
}

/// v2: lookup indexes
fn upgrade_to_v2(conn: &Connection) -> Result<()> {
    for sql in schema::CREATE_ALL_INDEXES {
        conn.execute(sql, [])?;
    }
    Ok(())
}

/// v3: case-folded `name_key` columns with unique indexes
///
/// Older files may hold names that only differ outside ASCII. The earliest
/// row keeps the plain key; later ones get their row ID appended so the
/// unique index can still be built.
fn upgrade_to_v3(conn: &Connection) -> Result<()> {
    for sql in schema::ADD_NAME_KEY_COLUMNS {
        conn.execute(sql, [])?;
    }
    backfill_name_keys(
        conn,
        "SELECT id, 0, name FROM themes ORDER BY id",
        "UPDATE themes SET name_key = ? WHERE id = ?",
    )?;
    backfill_name_keys(
        conn,
        "SELECT id, theme_id, name FROM types ORDER BY id",
        "UPDATE types SET name_key = ? WHERE id = ?",
    )?;
    conn.execute(schema::CREATE_THEMES_NAME_KEY_INDEX, [])?;
    conn.execute(schema::CREATE_TYPES_NAME_KEY_INDEX, [])?;
    Ok(())
}

fn backfill_name_keys(conn: &Connection, select_sql: &str, update_sql: &str) -> Result<()> {
    let rows: Vec<(i64, i64, String)> = {
        let mut stmt = conn.prepare(select_sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut seen = HashSet::new();
    let mut update = conn.prepare(update_sql)?;
    for (id, scope, name) in rows {
        let mut key = name_key(&name);
        if !seen.insert((scope, key.clone())) {
            warn!(id, name = %name, "name collides after case folding, keeping it distinct");
            key = format!("{}#{}", key, id);
        }
        update.execute(params![key, id])?;
    }
    Ok(())
}

/// Check if database version is compatible
pub fn is_version_compatible(version: u32) -> bool {
    version <= CURRENT_VERSION
}

/// Get the schema version recorded in the database
pub fn get_database_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Record the schema version in the database
pub fn set_database_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
    Ok(())
}
