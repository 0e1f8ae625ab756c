//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{
    format_wiki_timestamp, now_utc, parse_wiki_timestamp, trailing_day_range, Timestamp,
    TimestampError,
};
