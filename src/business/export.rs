//! JSON export functionality

use crate::database::{DisplayType, queries};
use crate::error::{StorageError, Result};
use crate::export::{DataTypeExport, ThemeExport};
use super::tracker::Tracker;

impl Tracker {
    /// Export a theme with every data type and point it owns
    pub fn export_theme(&self, theme_id: i64) -> Result<ThemeExport> {
        self.pool()?.run(|conn| {
            let theme = queries::get_theme(conn, theme_id)?
                .ok_or_else(|| StorageError::ThemeNotFound(theme_id.to_string()))?;

            let mut types = Vec::new();
            for display_type in [DisplayType::Record, DisplayType::Benchmark] {
                for data_type in queries::list_data_types(conn, theme_id, display_type)? {
                    let points = queries::list_data_points(conn, data_type.id)?;
                    types.push(DataTypeExport { data_type, points });
                }
            }

            Ok(ThemeExport::new(theme, types))
        })
    }

    /// Export a theme as pretty-printed JSON
    pub fn export_theme_json(&self, theme_id: i64) -> Result<String> {
        let export = self.export_theme(theme_id)?;
        Ok(serde_json::to_string_pretty(&export)?)
    }
}
