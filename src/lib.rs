//! # MonkeLogger Core
//!
//! Storage layer for a personal activity tracker.
//!
//! ## Features
//!
//! - User-defined themes (e.g. "exercise", "study")
//! - Record types: columns of a wide table, one row per timestamp
//! - Benchmark types: independent time series with a running average
//! - SQLite storage with versioned migrations
//! - Connection pool with scoped commit/rollback
//! - JSON export of a theme
//!
//! ## Example
//!
//! ```no_run
//! use monkelogger::Tracker;
//! use std::path::Path;
//!
//! let tracker = Tracker::open_path(Path::new("data.db")).unwrap();
//! let theme = tracker.create_theme("study").unwrap();
//! tracker.add_benchmark(theme.id, "Mock Test", 90.0).unwrap();
//!
//! for series in tracker.get_benchmarks(theme.id).unwrap() {
//!     println!("{}: {:?}", series.data_type.name, series.average());
//! }
//! ```

pub mod config;
pub mod database;
pub mod business;
pub mod views;
pub mod utils;
pub mod error;
pub mod export;

// Re-export main types
pub use error::{StorageError, Result};
pub use config::{Config, JournalMode};
pub use database::{ConnectionPool, PooledConnection};
pub use database::models::{Theme, DataType, DataPoint, DisplayType, NewDataType};
pub use business::Tracker;
pub use views::{BenchmarkSeries, Cell, RecordRow, RecordTable, RunningMean, ThemeView};
pub use export::{DataTypeExport, ThemeExport};
pub use utils::parse_value;

/// Default database filename
pub const DATABASE_FILENAME: &str = "data.db";

/// Default busy timeout in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Marker shown in a record table cell with no value
pub const NO_DATA_MARKER: &str = "_";
