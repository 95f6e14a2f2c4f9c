use chrono::{DateTime, Utc};

/// Seconds between 1900-01-01 00:00:00 UTC and the Unix epoch.
const EPOCH_1900_OFFSET_SECS: i64 = 2_208_988_800;

/// Hours since 1900-01-01 00:00 UTC, the unit of the persisted time axis
/// (gregorian calendar).
pub fn hours_since_1900(datetime: &DateTime<Utc>) -> f64 {
    (datetime.timestamp() + EPOCH_1900_OFFSET_SECS) as f64 / 3600.0
}

/// UTC datetime for an hours-since-1900 value, rounded to whole seconds.
/// Returns `None` for values outside the representable range.
pub fn datetime_from_hours(hours: f64) -> Option<DateTime<Utc>> {
    let secs = (hours * 3600.0).round() as i64 - EPOCH_1900_OFFSET_SECS;
    DateTime::from_timestamp(secs, 0)
}
