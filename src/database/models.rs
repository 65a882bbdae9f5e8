//! Data models for MonkeLogger database entities

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use crate::error::StorageError;

/// A user-defined top-level category owning a set of data types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Generated row ID
    pub id: i64,
    /// Creation timestamp
    pub created_on: DateTime<Local>,
    /// Theme name, unique ignoring case
    pub name: String,
}

/// How a data type is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    /// Column of the wide record table, grouped by timestamp
    Record,
    /// Independent scalar time series with a running average
    Benchmark,
}

impl DisplayType {
    /// Value stored in the `display_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayType::Record => "record",
            DisplayType::Benchmark => "benchmark",
        }
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "record" => Ok(DisplayType::Record),
            "benchmark" => Ok(DisplayType::Benchmark),
            other => Err(StorageError::Validation(format!("unknown display type '{}'", other))),
        }
    }
}

/// A named column/activity owned by one theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    /// Generated row ID
    pub id: i64,
    /// Creation timestamp
    pub created_on: DateTime<Local>,
    /// Owning theme
    pub theme_id: i64,
    /// Type name, unique per theme ignoring case
    pub name: String,
    /// Optional unit label (e.g. "kg", "%")
    pub unit: Option<String>,
    /// Rendering kind, fixed at creation
    pub display_type: DisplayType,
    /// Optional free-form rendering hint
    pub representation: Option<String>,
}

impl DataType {
    /// True if this type is a record column
    pub fn is_record(&self) -> bool {
        self.display_type == DisplayType::Record
    }

    /// True if this type is a benchmark series
    pub fn is_benchmark(&self) -> bool {
        self.display_type == DisplayType::Benchmark
    }
}

/// Attributes of a data type to create
#[derive(Debug, Clone, PartialEq)]
pub struct NewDataType {
    /// Type name
    pub name: String,
    /// Rendering kind
    pub display_type: DisplayType,
    /// Optional unit label
    pub unit: Option<String>,
    /// Optional rendering hint
    pub representation: Option<String>,
}

impl NewDataType {
    /// A record column with no unit or representation
    pub fn record(name: &str) -> Self {
        Self::new(name, DisplayType::Record)
    }

    /// A benchmark series with no unit or representation
    pub fn benchmark(name: &str) -> Self {
        Self::new(name, DisplayType::Benchmark)
    }

    fn new(name: &str, display_type: DisplayType) -> Self {
        Self {
            name: name.to_string(),
            display_type,
            unit: None,
            representation: None,
        }
    }

    /// Set the unit label
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Set the rendering hint
    pub fn with_representation(mut self, representation: &str) -> Self {
        self.representation = Some(representation.to_string());
        self
    }
}

/// One timestamped observation for a data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Data type this point belongs to
    pub type_id: i64,
    /// When the point was written
    pub created_on: DateTime<Local>,
    /// Logical event time
    pub timestamp: DateTime<Local>,
    /// Observed value, `None` when left blank
    pub val: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_type_round_trip() {
        assert_eq!("record".parse::<DisplayType>().unwrap(), DisplayType::Record);
        assert_eq!("benchmark".parse::<DisplayType>().unwrap(), DisplayType::Benchmark);
        assert_eq!(DisplayType::Benchmark.to_string(), "benchmark");
    }

    #[test]
    fn test_display_type_unknown() {
        let result = "chart".parse::<DisplayType>();
        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[test]
    fn test_new_data_type_builder() {
        let ty = NewDataType::benchmark("Mock Test").with_unit("%").with_representation("line");
        assert_eq!(ty.display_type, DisplayType::Benchmark);
        assert_eq!(ty.unit.as_deref(), Some("%"));
        assert_eq!(ty.representation.as_deref(), Some("line"));

        let ty = NewDataType::record("arms");
        assert_eq!(ty.display_type, DisplayType::Record);
        assert!(ty.unit.is_none());
    }

    #[test]
    fn test_display_type_serde() {
        let json = serde_json::to_string(&DisplayType::Record).unwrap();
        assert_eq!(json, "\"record\"");
    }
}
