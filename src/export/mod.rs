//! Export functionality for MonkeLogger
//!
//! This module provides the snapshot structures a theme is exported as.

use serde::{Deserialize, Serialize};
use crate::database::{DataPoint, DataType, Theme};

/// One data type and all of its points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeExport {
    /// The data type
    #[serde(flatten)]
    pub data_type: DataType,
    /// Points in ascending timestamp order
    pub points: Vec<DataPoint>,
}

/// Snapshot of a theme with every data type and point it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeExport {
    /// Crate version that produced the export
    pub exported_by: String,
    /// The theme
    pub theme: Theme,
    /// Data types, most recently defined first within each display type
    pub types: Vec<DataTypeExport>,
}

impl ThemeExport {
    /// Create a new export for `theme`
    pub fn new(theme: Theme, types: Vec<DataTypeExport>) -> Self {
        Self {
            exported_by: format!("monkelogger {}", env!("CARGO_PKG_VERSION")),
            theme,
            types,
        }
    }

    /// Total number of points across every type
    pub fn point_count(&self) -> usize {
        self.types.iter().map(|t| t.points.len()).sum()
    }
}
