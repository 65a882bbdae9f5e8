//! Data point operations
//!
//! Data points are append-only: there is no update or delete.

use chrono::{DateTime, Local};
use tracing::debug;
use crate::database::{DataPoint, DataType, DisplayType, NewDataType, queries};
use crate::error::{StorageError, Result};
use crate::utils::{now, validate_name, validate_value};
use super::tracker::Tracker;

impl Tracker {
    /// Append one data point
    ///
    /// Fails with [`StorageError::Constraint`] if the data type does not exist.
    pub fn write_data_point(
        &self,
        type_id: i64,
        created_on: DateTime<Local>,
        timestamp: DateTime<Local>,
        val: Option<f64>,
    ) -> Result<DataPoint> {
        let point = DataPoint {
            type_id,
            created_on,
            timestamp,
            val: validate_value(val)?,
        };

        self.pool()?.run(|conn| {
            if queries::get_data_type(conn, type_id)?.is_none() {
                return Err(StorageError::Constraint(format!("data type {} does not exist", type_id)));
            }
            queries::insert_data_point(conn, &point)
        })?;

        Ok(point)
    }

    /// Append one record row: a point per record type, all at `timestamp`
    ///
    /// Every type must be a record type of the theme. The row is written in a
    /// single transaction; on any failure nothing is stored.
    pub fn write_record(
        &self,
        theme_id: i64,
        timestamp: DateTime<Local>,
        values: &[(i64, Option<f64>)],
    ) -> Result<Vec<DataPoint>> {
        let created_on = now();
        let points = values
            .iter()
            .map(|&(type_id, val)| -> Result<DataPoint> {
                Ok(DataPoint {
                    type_id,
                    created_on,
                    timestamp,
                    val: validate_value(val)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.pool()?.run(|conn| {
            if queries::get_theme(conn, theme_id)?.is_none() {
                return Err(StorageError::ThemeNotFound(theme_id.to_string()));
            }
            for point in &points {
                match queries::get_data_type(conn, point.type_id)? {
                    Some(ty) if ty.theme_id == theme_id && ty.is_record() => {}
                    _ => {
                        return Err(StorageError::Validation(format!(
                            "data type {} is not a record type of theme {}",
                            point.type_id, theme_id
                        )));
                    }
                }
                queries::insert_data_point(conn, point)?;
            }
            Ok(())
        })?;

        debug!(theme_id, count = points.len(), "record written");
        Ok(points)
    }

    /// Record a benchmark value, creating the benchmark type if needed
    pub fn add_benchmark(&self, theme_id: i64, name: &str, val: f64) -> Result<(DataType, DataPoint)> {
        let new_type = NewDataType::benchmark(&validate_name("benchmark", name)?);
        let val = validate_value(Some(val))?;
        let at = now();

        self.pool()?.run(|conn| {
            let data_type = queries::get_or_create_data_type(conn, theme_id, &new_type, &at)?;
            if data_type.display_type != DisplayType::Benchmark {
                return Err(StorageError::Validation(format!(
                    "'{}' is already a {} type",
                    data_type.name, data_type.display_type
                )));
            }

            let point = DataPoint {
                type_id: data_type.id,
                created_on: at,
                timestamp: at,
                val,
            };
            queries::insert_data_point(conn, &point)?;
            Ok((data_type, point))
        })
    }

    /// Get a data type's points in ascending timestamp order
    pub fn get_data_points(&self, type_id: i64) -> Result<Vec<DataPoint>> {
        self.pool()?.run(|conn| queries::list_data_points(conn, type_id))
    }
}
