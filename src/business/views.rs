//! Read views for the view layer
//!
//! Each view is read in a single unit of work so that its parts agree with
//! one another.

use rusqlite::Connection;
use crate::database::{DisplayType, queries};
use crate::error::{StorageError, Result};
use crate::views::{BenchmarkSeries, RecordTable, ThemeView};
use super::tracker::Tracker;

impl Tracker {
    /// Get a theme's record types grouped by timestamp into rows
    pub fn get_record_table(&self, theme_id: i64) -> Result<RecordTable> {
        self.pool()?.run(|conn| load_record_table(conn, theme_id))
    }

    /// Get one benchmark type's series with its running average
    pub fn get_benchmark_series(&self, type_id: i64) -> Result<BenchmarkSeries> {
        self.pool()?.run(|conn| {
            let data_type = queries::get_data_type(conn, type_id)?
                .ok_or(StorageError::DataTypeNotFound(type_id))?;
            let points = queries::list_data_points(conn, type_id)?;
            Ok(BenchmarkSeries::new(data_type, points))
        })
    }

    /// Get every benchmark series of a theme, most recently defined first
    pub fn get_benchmarks(&self, theme_id: i64) -> Result<Vec<BenchmarkSeries>> {
        self.pool()?.run(|conn| load_benchmarks(conn, theme_id))
    }

    /// Get the full record table and benchmark series of a theme
    pub fn get_theme_view(&self, theme_id: i64) -> Result<ThemeView> {
        self.pool()?.run(|conn| {
            let theme = queries::get_theme(conn, theme_id)?
                .ok_or_else(|| StorageError::ThemeNotFound(theme_id.to_string()))?;
            Ok(ThemeView {
                theme,
                records: load_record_table(conn, theme_id)?,
                benchmarks: load_benchmarks(conn, theme_id)?,
            })
        })
    }
}

fn load_record_table(conn: &Connection, theme_id: i64) -> Result<RecordTable> {
    let columns = queries::list_data_types(conn, theme_id, DisplayType::Record)?;
    let points = queries::list_theme_data_points(conn, theme_id, DisplayType::Record)?;
    Ok(RecordTable::group(columns, points))
}

fn load_benchmarks(conn: &Connection, theme_id: i64) -> Result<Vec<BenchmarkSeries>> {
    queries::list_data_types(conn, theme_id, DisplayType::Benchmark)?
        .into_iter()
        .map(|data_type| -> Result<BenchmarkSeries> {
            let points = queries::list_data_points(conn, data_type.id)?;
            Ok(BenchmarkSeries::new(data_type, points))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, TimeZone};
    use crate::business::tracker::tests::create_test_tracker;
    use crate::error::StorageError;
    use crate::views::Cell;

    #[test]
    fn test_record_table_sentinel() {
        let (tracker, _temp) = create_test_tracker();
        let theme = tracker.create_theme("exercise").unwrap();
        let arms = tracker.create_record_type(theme.id, "arms").unwrap();
        let shoulder = tracker.create_record_type(theme.id, "shoulder").unwrap();
        tracker.create_benchmark_type(theme.id, "pushups").unwrap();

        let t1 = Local.timestamp_opt(1_700_000_000, 0).unwrap();
        let t2 = t1 + Duration::seconds(90);
        tracker.write_record(theme.id, t1, &[(arms.id, Some(10.0))]).unwrap();
        tracker.write_record(theme.id, t2, &[(arms.id, Some(10.0)), (shoulder.id, Some(15.0))]).unwrap();

        let table = tracker.get_record_table(theme.id).unwrap();
        let arms_col = table.column_index(arms.id).unwrap();
        let shoulder_col = table.column_index(shoulder.id).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].timestamp, t1);
        assert_eq!(table.rows[0].cells[arms_col], Cell::Value(10.0));
        assert_eq!(table.rows[0].cells[shoulder_col], Cell::NoData);
        assert_eq!(table.rows[1].cells[shoulder_col], Cell::Value(15.0));
    }

    #[test]
    fn test_record_table_no_types() {
        let (tracker, _temp) = create_test_tracker();
        let theme = tracker.create_theme("empty").unwrap();
        let table = tracker.get_record_table(theme.id).unwrap();
        assert!(table.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_benchmark_series_average() {
        let (tracker, _temp) = create_test_tracker();
        let theme = tracker.create_theme("study").unwrap();
        let mock = tracker.create_benchmark_type(theme.id, "Mock Test").unwrap();
        for val in [80.0, 90.0, 100.0] {
            tracker.add_benchmark(theme.id, "Mock Test", val).unwrap();
        }

        let series = tracker.get_benchmark_series(mock.id).unwrap();
        assert_eq!(series.points.len(), 3);
        assert!((series.average().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_benchmark_series_not_found() {
        let (tracker, _temp) = create_test_tracker();
        assert!(matches!(tracker.get_benchmark_series(3), Err(StorageError::DataTypeNotFound(3))));
    }

    #[test]
    fn test_theme_view() {
        let (tracker, _temp) = create_test_tracker();
        let theme = tracker.create_theme("exercise").unwrap();
        let arms = tracker.create_record_type(theme.id, "arms").unwrap();
        tracker.write_record(theme.id, Local::now(), &[(arms.id, Some(3.0))]).unwrap();
        tracker.add_benchmark(theme.id, "pushups", 20.0).unwrap();
        tracker.add_benchmark(theme.id, "situps", 30.0).unwrap();

        let view = tracker.get_theme_view(theme.id).unwrap();
        assert_eq!(view.theme, theme);
        assert_eq!(view.records.rows.len(), 1);
        assert_eq!(view.benchmarks.len(), 2);
        assert_eq!(tracker.get_benchmarks(theme.id).unwrap(), view.benchmarks);
    }

    #[test]
    fn test_theme_view_not_found() {
        let (tracker, _temp) = create_test_tracker();
        assert!(matches!(tracker.get_theme_view(8), Err(StorageError::ThemeNotFound(_))));
    }
}
