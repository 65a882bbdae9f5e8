//! Derived read views
//!
//! Computed in memory from rows read back from storage; nothing here is
//! persisted.

use std::fmt;
use chrono::{DateTime, Local};
use serde::Serialize;
use crate::database::{DataPoint, DataType, Theme};
use crate::NO_DATA_MARKER;

/// Incremental arithmetic mean
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningMean {
    mean: f64,
    count: u64,
}

impl RunningMean {
    /// Empty mean
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one more value
    pub fn push(&mut self, value: f64) {
        let n = self.count as f64;
        self.mean = (self.mean * n + value) / (n + 1.0);
        self.count += 1;
    }

    /// Current mean, `None` before the first value
    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Number of values folded in
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// One cell of the record table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Cell {
    /// A stored value
    Value(f64),
    /// No value for this column at this timestamp
    NoData,
}

impl Cell {
    /// The value, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Value(v) => Some(*v),
            Cell::NoData => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Value(v) => write!(f, "{}", v),
            Cell::NoData => f.write_str(NO_DATA_MARKER),
        }
    }
}

/// Record points sharing one timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    /// Shared event time
    pub timestamp: DateTime<Local>,
    /// One cell per table column, in column order
    pub cells: Vec<Cell>,
}

/// Wide table of a theme's record types keyed by timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordTable {
    /// Record types, in display order
    pub columns: Vec<DataType>,
    /// Rows in ascending timestamp order
    pub rows: Vec<RecordRow>,
}

impl RecordTable {
    /// Group record points by exact timestamp into rows
    ///
    /// Points whose type is not among `columns` are ignored. When a column has
    /// more than one point at the same timestamp, the first one wins.
    pub fn group(columns: Vec<DataType>, mut points: Vec<DataPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);

        let rows = points
            .chunk_by(|a, b| a.timestamp == b.timestamp)
            .map(|group| RecordRow {
                timestamp: group[0].timestamp,
                cells: columns
                    .iter()
                    .map(|column| {
                        group
                            .iter()
                            .find(|p| p.type_id == column.id)
                            .and_then(|p| p.val)
                            .map_or(Cell::NoData, Cell::Value)
                    })
                    .collect(),
            })
            .filter(|row| !row.cells.is_empty())
            .collect();

        Self { columns, rows }
    }

    /// True if the theme has no record types
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names, in display order
    pub fn headings(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Index of a column by type ID
    pub fn column_index(&self, type_id: i64) -> Option<usize> {
        self.columns.iter().position(|c| c.id == type_id)
    }
}

/// One benchmark type's points with their running average
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSeries {
    /// The benchmark type
    pub data_type: DataType,
    /// Points in ascending timestamp order
    pub points: Vec<DataPoint>,
    /// Mean of the non-null values
    pub mean: RunningMean,
}

impl BenchmarkSeries {
    /// Build a series from points already in timestamp order
    pub fn new(data_type: DataType, points: Vec<DataPoint>) -> Self {
        let mut mean = RunningMean::new();
        for val in points.iter().filter_map(|p| p.val) {
            mean.push(val);
        }
        Self { data_type, points, mean }
    }

    /// Append a freshly written point
    pub fn push(&mut self, point: DataPoint) {
        if let Some(val) = point.val {
            self.mean.push(val);
        }
        self.points.push(point);
    }

    /// Running average, `None` until a value is recorded
    pub fn average(&self) -> Option<f64> {
        self.mean.value()
    }

    /// Time of the most recent point
    pub fn last_recorded(&self) -> Option<DateTime<Local>> {
        self.points.last().map(|p| p.timestamp)
    }
}

/// Everything the view layer shows for one theme
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeView {
    /// The theme
    pub theme: Theme,
    /// Record types grouped into rows
    pub records: RecordTable,
    /// One series per benchmark type, most recently defined first
    pub benchmarks: Vec<BenchmarkSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crate::database::DisplayType;

    fn t(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn data_type(id: i64, name: &str, display_type: DisplayType) -> DataType {
        DataType {
            id,
            created_on: t(0),
            theme_id: 1,
            name: name.to_string(),
            unit: None,
            display_type,
            representation: None,
        }
    }

    fn point(type_id: i64, at: DateTime<Local>, val: Option<f64>) -> DataPoint {
        DataPoint { type_id, created_on: at, timestamp: at, val }
    }

    #[test]
    fn test_running_mean() {
        let mut mean = RunningMean::new();
        assert_eq!(mean.value(), None);

        for v in [80.0, 90.0, 100.0] {
            mean.push(v);
        }
        assert_eq!(mean.count(), 3);
        assert!((mean.value().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_running_mean_matches_arithmetic_mean() {
        let values: Vec<f64> = (1..=200).map(|i| (i as f64) * 0.37 + (i % 7) as f64).collect();
        let mut mean = RunningMean::new();
        for v in &values {
            mean.push(*v);
        }
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean.value().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_record_table_grouping() {
        let arms = data_type(1, "arms", DisplayType::Record);
        let shoulder = data_type(2, "shoulder", DisplayType::Record);

        let t1 = t(0);
        let t2 = t1 + Duration::seconds(30);
        let points = vec![
            point(1, t2, Some(10.0)),
            point(2, t2, Some(15.0)),
            point(1, t1, Some(10.0)),
        ];

        let table = RecordTable::group(vec![arms, shoulder], points);
        assert_eq!(table.headings(), vec!["arms", "shoulder"]);
        assert_eq!(table.rows.len(), 2);

        assert_eq!(table.rows[0].timestamp, t1);
        assert_eq!(table.rows[0].cells, vec![Cell::Value(10.0), Cell::NoData]);

        assert_eq!(table.rows[1].timestamp, t2);
        assert_eq!(table.rows[1].cells, vec![Cell::Value(10.0), Cell::Value(15.0)]);
    }

    #[test]
    fn test_record_table_null_and_zero() {
        let a = data_type(1, "a", DisplayType::Record);
        let b = data_type(2, "b", DisplayType::Record);
        let points = vec![point(1, t(0), Some(0.0)), point(2, t(0), None)];

        let table = RecordTable::group(vec![a, b], points);
        assert_eq!(table.rows[0].cells, vec![Cell::Value(0.0), Cell::NoData]);
        assert_eq!(table.rows[0].cells[0].to_string(), "0");
        assert_eq!(table.rows[0].cells[1].to_string(), "_");
    }

    #[test]
    fn test_record_table_without_columns() {
        let table = RecordTable::group(Vec::new(), vec![point(1, t(0), Some(1.0))]);
        assert!(table.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_column_index() {
        let table = RecordTable::group(
            vec![data_type(5, "x", DisplayType::Record), data_type(3, "y", DisplayType::Record)],
            Vec::new(),
        );
        assert_eq!(table.column_index(3), Some(1));
        assert_eq!(table.column_index(9), None);
    }

    #[test]
    fn test_benchmark_series() {
        let ty = data_type(1, "Mock Test", DisplayType::Benchmark);
        let points = vec![point(1, t(0), Some(80.0)), point(1, t(10), None), point(1, t(20), Some(90.0))];

        let mut series = BenchmarkSeries::new(ty, points);
        assert!((series.average().unwrap() - 85.0).abs() < 1e-9);

        series.push(point(1, t(30), Some(100.0)));
        assert!((series.average().unwrap() - 90.0).abs() < 1e-9);
        assert_eq!(series.last_recorded(), Some(t(30)));
        assert_eq!(series.points.len(), 4);
    }

    #[test]
    fn test_empty_benchmark_series() {
        let series = BenchmarkSeries::new(data_type(1, "x", DisplayType::Benchmark), Vec::new());
        assert_eq!(series.average(), None);
        assert_eq!(series.last_recorded(), None);
    }
}
