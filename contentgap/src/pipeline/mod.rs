//! Filter, rank and checkpoint execution.
//!
//! This module provides:
//! - The streaming engine with time-boxed checkpoints
//! - A batch filter-then-rank analysis
//! - Checkpoint configuration and an injectable clock

mod batch;
mod checkpoint;
mod clock;
mod engine;

#[cfg(test)]
mod integration_tests;

pub use batch::{ContentGap, GapMetadata};
pub use checkpoint::{Checkpoint, CheckpointAction};
pub use clock::{Clock, SystemClock};
pub use engine::PipelineEngine;
