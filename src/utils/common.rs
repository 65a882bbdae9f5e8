//! Common utility functions

use chrono::{DateTime, Local, TimeZone};
use crate::error::{StorageError, Result};

/// Display format for timestamps (day/month/year)
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Encode a datetime as Unix-epoch seconds for storage
pub fn encode_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    dt.timestamp()
}

/// Decode stored Unix-epoch seconds into a local datetime
pub fn decode_timestamp(secs: i64) -> Result<DateTime<Local>> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.with_timezone(&Local))
        .ok_or_else(|| StorageError::Database(format!("timestamp out of range: {}", secs)))
}

/// Current local time truncated to whole seconds
pub fn now() -> DateTime<Local> {
    let now = Local::now();
    decode_timestamp(now.timestamp()).unwrap_or(now)
}

/// Format a timestamp for display
pub fn format_timestamp(dt: &DateTime<Local>) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}
