//! SQL query operations for database access
//!
//! This module provides low-level query functions over a single connection.
//! Transaction scoping belongs to the caller; for application-level
//! operations, use the Tracker API.

use chrono::{DateTime, Local};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, warn};
use crate::error::{StorageError, Result};
use crate::utils::{decode_timestamp, encode_timestamp, name_key};
use super::models::{DataPoint, DataType, DisplayType, NewDataType, Theme};

// ============================================================================
// Theme queries
// ============================================================================

/// Get a theme by ID
pub fn get_theme(conn: &Connection, theme_id: i64) -> Result<Option<Theme>> {
    let raw = conn.query_row(
        "SELECT id, created_on, name FROM themes WHERE id = ?",
        params![theme_id],
        RawTheme::from_row,
    ).optional()?;
    raw.map(Theme::try_from).transpose()
}

/// Get a theme by name, ignoring case
pub fn get_theme_by_name(conn: &Connection, name: &str) -> Result<Option<Theme>> {
    let raw = conn.query_row(
        "SELECT id, created_on, name FROM themes WHERE name_key = ?",
        params![name_key(name)],
        RawTheme::from_row,
    ).optional()?;
    raw.map(Theme::try_from).transpose()
}

/// Get the theme with this name, creating it if absent
///
/// The first writer of a name fixes its identity and stored casing.
pub fn get_or_create_theme(conn: &Connection, name: &str, created_on: &DateTime<Local>) -> Result<Theme> {
    if let Some(theme) = get_theme_by_name(conn, name)? {
        return Ok(theme);
    }

    let inserted = conn.execute(
        "INSERT INTO themes (created_on, name, name_key) VALUES (?, ?, ?)
         ON CONFLICT DO NOTHING",
        params![encode_timestamp(created_on), name, name_key(name)],
    )?;
    if inserted > 0 {
        debug!(name, "theme created");
    }

    get_theme_by_name(conn, name)?
        .ok_or_else(|| StorageError::ThemeNotFound(name.to_string()))
}

/// Get all themes in insertion order
pub fn list_themes(conn: &Connection) -> Result<Vec<Theme>> {
    let mut stmt = conn.prepare("SELECT id, created_on, name FROM themes ORDER BY id")?;
    let rows = stmt.query_map([], RawTheme::from_row)?;

    rows.map(|raw| Theme::try_from(raw?)).collect()
}

// ============================================================================
// Data type queries
// ============================================================================

const DATA_TYPE_COLUMNS: &str =
    "id, created_on, theme_id, name, unit, display_type, representation";

/// Get a data type by ID
pub fn get_data_type(conn: &Connection, type_id: i64) -> Result<Option<DataType>> {
    let raw = conn.query_row(
        &format!("SELECT {} FROM types WHERE id = ?", DATA_TYPE_COLUMNS),
        params![type_id],
        RawDataType::from_row,
    ).optional()?;
    raw.map(DataType::try_from).transpose()
}

/// Get a theme's data type by name, ignoring case
pub fn get_data_type_by_name(conn: &Connection, theme_id: i64, name: &str) -> Result<Option<DataType>> {
    let raw = conn.query_row(
        &format!("SELECT {} FROM types WHERE theme_id = ? AND name_key = ?", DATA_TYPE_COLUMNS),
        params![theme_id, name_key(name)],
        RawDataType::from_row,
    ).optional()?;
    raw.map(DataType::try_from).transpose()
}

/// Get the data type with this name under a theme, creating it if absent
///
/// The row is re-read after the insert, so concurrent creators resolve to
/// the same stored type. Attributes of an existing type are never changed.
pub fn get_or_create_data_type(
    conn: &Connection,
    theme_id: i64,
    new_type: &NewDataType,
    created_on: &DateTime<Local>,
) -> Result<DataType> {
    if get_theme(conn, theme_id)?.is_none() {
        return Err(StorageError::ThemeNotFound(theme_id.to_string()));
    }

    let inserted = conn.execute(
        "INSERT INTO types (created_on, theme_id, name, name_key, unit, display_type, representation)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT DO NOTHING",
        params![
            encode_timestamp(created_on),
            theme_id,
            new_type.name,
            name_key(&new_type.name),
            new_type.unit,
            new_type.display_type.as_str(),
            new_type.representation,
        ],
    )?;

    let stored = get_data_type_by_name(conn, theme_id, &new_type.name)?
        .ok_or_else(|| StorageError::Database(format!("data type '{}' vanished after insert", new_type.name)))?;

    if inserted > 0 {
        debug!(theme_id, name = %stored.name, display_type = %stored.display_type, "data type created");
    } else if stored.display_type != new_type.display_type {
        warn!(
            theme_id,
            name = %stored.name,
            stored = %stored.display_type,
            requested = %new_type.display_type,
            "data type already exists with a different display type"
        );
    }

    Ok(stored)
}

/// Get a theme's data types of one display type, most recently defined first
pub fn list_data_types(conn: &Connection, theme_id: i64, display_type: DisplayType) -> Result<Vec<DataType>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM types WHERE theme_id = ? AND display_type = ?
         ORDER BY created_on DESC, id DESC",
        DATA_TYPE_COLUMNS
    ))?;
    let rows = stmt.query_map(params![theme_id, display_type.as_str()], RawDataType::from_row)?;

    rows.map(|raw| DataType::try_from(raw?)).collect()
}

// ============================================================================
// Data point queries
// ============================================================================

/// Append a data point
pub fn insert_data_point(conn: &Connection, point: &DataPoint) -> Result<()> {
    conn.execute(
        "INSERT INTO data (type_id, created_on, timestamp, val) VALUES (?, ?, ?, ?)",
        params![
            point.type_id,
            encode_timestamp(&point.created_on),
            encode_timestamp(&point.timestamp),
            point.val,
        ],
    )?;
    Ok(())
}

/// Get a data type's points in ascending timestamp order
pub fn list_data_points(conn: &Connection, type_id: i64) -> Result<Vec<DataPoint>> {
    let mut stmt = conn.prepare(
        "SELECT type_id, created_on, timestamp, val FROM data
         WHERE type_id = ? ORDER BY timestamp ASC, rowid ASC"
    )?;
    let rows = stmt.query_map(params![type_id], RawDataPoint::from_row)?;

    rows.map(|raw| DataPoint::try_from(raw?)).collect()
}

/// Get the points of every data type of one display type under a theme,
/// in ascending timestamp order
pub fn list_theme_data_points(
    conn: &Connection,
    theme_id: i64,
    display_type: DisplayType,
) -> Result<Vec<DataPoint>> {
    let mut stmt = conn.prepare(
        "SELECT d.type_id, d.created_on, d.timestamp, d.val
         FROM data d JOIN types t ON t.id = d.type_id
         WHERE t.theme_id = ? AND t.display_type = ?
         ORDER BY d.timestamp ASC, d.rowid ASC"
    )?;
    let rows = stmt.query_map(params![theme_id, display_type.as_str()], RawDataPoint::from_row)?;

    rows.map(|raw| DataPoint::try_from(raw?)).collect()
}

/// Count all data points of a data type
pub fn count_data_points(conn: &Connection, type_id: i64) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM data WHERE type_id = ?",
        params![type_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ============================================================================
// Raw data structures (before timestamp decoding)
// ============================================================================

/// Raw theme row
#[derive(Debug, Clone)]
pub struct RawTheme {
    /// Row ID
    pub id: i64,
    /// Creation time, epoch seconds
    pub created_on: i64,
    /// Theme name
    pub name: String,
}

impl RawTheme {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_on: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

impl TryFrom<RawTheme> for Theme {
    type Error = StorageError;

    fn try_from(raw: RawTheme) -> Result<Self> {
        Ok(Theme {
            id: raw.id,
            created_on: decode_timestamp(raw.created_on)?,
            name: raw.name,
        })
    }
}

/// Raw data type row
#[derive(Debug, Clone)]
pub struct RawDataType {
    /// Row ID
    pub id: i64,
    /// Creation time, epoch seconds
    pub created_on: i64,
    /// Owning theme
    pub theme_id: i64,
    /// Type name
    pub name: String,
    /// Unit label
    pub unit: Option<String>,
    /// Stored display type ("record" or "benchmark")
    pub display_type: String,
    /// Rendering hint
    pub representation: Option<String>,
}

impl RawDataType {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_on: row.get(1)?,
            theme_id: row.get(2)?,
            name: row.get(3)?,
            unit: row.get(4)?,
            display_type: row.get(5)?,
            representation: row.get(6)?,
        })
    }
}

impl TryFrom<RawDataType> for DataType {
    type Error = StorageError;

    fn try_from(raw: RawDataType) -> Result<Self> {
        let display_type = raw.display_type.parse().map_err(|_| {
            StorageError::Database(format!("stored display type '{}' is invalid", raw.display_type))
        })?;
        Ok(DataType {
            id: raw.id,
            created_on: decode_timestamp(raw.created_on)?,
            theme_id: raw.theme_id,
            name: raw.name,
            unit: raw.unit,
            display_type,
            representation: raw.representation,
        })
    }
}

/// Raw data point row
#[derive(Debug, Clone)]
pub struct RawDataPoint {
    /// Data type
    pub type_id: i64,
    /// Write time, epoch seconds
    pub created_on: i64,
    /// Event time, epoch seconds
    pub timestamp: i64,
    /// Value
    pub val: Option<f64>,
}

impl RawDataPoint {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            type_id: row.get(0)?,
            created_on: row.get(1)?,
            timestamp: row.get(2)?,
            val: row.get(3)?,
        })
    }
}

impl TryFrom<RawDataPoint> for DataPoint {
    type Error = StorageError;

    fn try_from(raw: RawDataPoint) -> Result<Self> {
        Ok(DataPoint {
            type_id: raw.type_id,
            created_on: decode_timestamp(raw.created_on)?,
            timestamp: decode_timestamp(raw.timestamp)?,
            val: raw.val,
        })
    }
}
