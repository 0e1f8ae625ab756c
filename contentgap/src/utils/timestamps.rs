//! Timestamp helpers for wiki and page-view APIs.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Errors that can occur during timestamp parsing.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// The timestamp string is empty.
    #[error("Empty timestamp string")]
    EmptyString,

    /// The timestamp value is invalid.
    #[error("Invalid timestamp: {0}")]
    InvalidFormat(String),
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Parses a timestamp as returned by the MediaWiki API (`2024-01-05T12:00:00Z`).
pub fn parse_wiki_timestamp(input: &str) -> Result<Timestamp, TimestampError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::EmptyString);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TimestampError::InvalidFormat(trimmed.to_string()))
}

/// Formats a timestamp the way the MediaWiki API accepts it.
#[must_use]
pub fn format_wiki_timestamp(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Day bounds (`YYYYMMDD`) of a trailing window of `days` days ending on `end`.
///
/// Both bounds are inclusive, so the window covers exactly `days` days.
#[must_use]
pub fn trailing_day_range(end: NaiveDate, days: u32) -> (String, String) {
    let start = end - Duration::days(i64::from(days.saturating_sub(1)));
    (
        start.format("%Y%m%d").to_string(),
        end.format("%Y%m%d").to_string(),
    )
}
