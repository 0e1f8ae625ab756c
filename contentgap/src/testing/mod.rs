//! Testing utilities for content gap runs.
//!
//! This module provides:
//! - An in-memory wiki and page-view table
//! - A manual clock and a recording checkpoint action
//! - Assertions for rankings and snapshots

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_ranked_desc, assert_snapshot_counts, assert_titles};
pub use fixtures::{
    articles, item_stream, result_stream, ManualClock, RecordingCheckpoint,
};
pub use mocks::{FixedPopularity, InMemoryWiki, WikiCall};
