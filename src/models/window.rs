//! Half-open date windows and the timestamp formats accepted for them

use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A half-open interval `[start, end)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The one-day window starting at `start`
    pub fn day(start: DateTime<Utc>) -> Self {
        Self::new(start, start + Duration::days(1))
    }

    /// Whether `instant` lies in `[start, end)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether `day` falls within the window or on the calendar date of
    /// either bound, regardless of time of day
    pub fn matches_day(&self, day: DateTime<Utc>) -> bool {
        self.contains(day)
            || day.date_naive() == self.start.date_naive()
            || day.date_naive() == self.end.date_naive()
    }

    /// `since` query parameter
    pub fn since_param(&self) -> String {
        self.start.to_rfc3339()
    }

    /// `until` query parameter
    pub fn until_param(&self) -> String {
        self.end.to_rfc3339()
    }
}

/// Parse a timestamp given on the command line or in a window file.
///
/// Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC), or a
/// plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(AppError::Configuration(format!(
        "unrecognised timestamp '{}'",
        input
    )))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
