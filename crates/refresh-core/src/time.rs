//! Exchange timestamp handling.
//!
//! The exchange reports timestamps as ISO-8601 without a zone designator
//! (e.g. `2017-11-03T18:22:40.67`). They are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{CoreError, Result};

const EXCHANGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Parse an exchange timestamp, with or without a trailing zone designator.
pub fn parse_exchange_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, EXCHANGE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| CoreError::InvalidTimestamp(format!("{s}: {e}")))
}

/// Format a timestamp the way the exchange does.
pub fn format_exchange_timestamp(dt: &DateTime<Utc>) -> String {
    dt.naive_utc().format(EXCHANGE_FORMAT).to_string()
}

/// Elapsed time between `earlier` and `now` in fractional days.
pub fn age_days(earlier: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - earlier).num_milliseconds() as f64 / MS_PER_DAY
}

/// Compact UTC stamp used in backup file names: `YYYYMMDDHHMMSS` + `Z`.
pub fn backup_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%SZ").to_string()
}
