//! Theme operations
//!
//! This module provides theme management operations for the Tracker.

use crate::database::{Theme, queries};
use crate::error::{StorageError, Result};
use crate::utils::{now, validate_name};
use super::tracker::Tracker;

impl Tracker {
    /// Create a theme, or return the existing one with the same name
    ///
    /// Names are compared ignoring case; the first spelling stored is kept.
    pub fn create_theme(&self, name: &str) -> Result<Theme> {
        let name = validate_name("theme", name)?;
        let created_on = now();
        self.pool()?.run(|conn| queries::get_or_create_theme(conn, &name, &created_on))
    }

    /// Get all themes in creation order
    pub fn get_themes(&self) -> Result<Vec<Theme>> {
        self.pool()?.run(queries::list_themes)
    }

    /// Get a theme by ID
    pub fn get_theme(&self, theme_id: i64) -> Result<Theme> {
        self.pool()?
            .run(|conn| queries::get_theme(conn, theme_id))?
            .ok_or_else(|| StorageError::ThemeNotFound(theme_id.to_string()))
    }

    /// Find a theme by name, ignoring case
    pub fn find_theme(&self, name: &str) -> Result<Option<Theme>> {
        let name = name.trim();
        self.pool()?.run(|conn| queries::get_theme_by_name(conn, name))
    }
}
