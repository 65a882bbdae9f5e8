//! Data type operations
//!
//! This module provides record and benchmark type management for the Tracker.

use crate::database::{DataType, DisplayType, NewDataType, queries};
use crate::error::{StorageError, Result};
use crate::utils::{now, validate_name};
use super::tracker::Tracker;

impl Tracker {
    /// Create a data type under a theme, or return the existing one
    ///
    /// Repeated calls with the same theme and name (ignoring case) return the
    /// type as first stored; its attributes are never overwritten.
    pub fn create_data_type(&self, theme_id: i64, new_type: NewDataType) -> Result<DataType> {
        let new_type = NewDataType {
            name: validate_name("data type", &new_type.name)?,
            ..new_type
        };
        let created_on = now();
        self.pool()?.run(|conn| queries::get_or_create_data_type(conn, theme_id, &new_type, &created_on))
    }

    /// Create a record column
    pub fn create_record_type(&self, theme_id: i64, name: &str) -> Result<DataType> {
        self.create_data_type(theme_id, NewDataType::record(name))
    }

    /// Create a benchmark series
    pub fn create_benchmark_type(&self, theme_id: i64, name: &str) -> Result<DataType> {
        self.create_data_type(theme_id, NewDataType::benchmark(name))
    }

    /// Get a theme's types of one display type, most recently defined first
    pub fn get_data_types(&self, theme_id: i64, display_type: DisplayType) -> Result<Vec<DataType>> {
        self.pool()?.run(|conn| queries::list_data_types(conn, theme_id, display_type))
    }

    /// Get a data type by ID
    pub fn get_data_type(&self, type_id: i64) -> Result<DataType> {
        self.pool()?
            .run(|conn| queries::get_data_type(conn, type_id))?
            .ok_or(StorageError::DataTypeNotFound(type_id))
    }
}
