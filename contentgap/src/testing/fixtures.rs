//! Test fixtures for pipeline runs.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::core::{Item, RunSnapshot};
use crate::corpus::ItemStream;
use crate::errors::{GapError, GapResult};
use crate::pipeline::{CheckpointAction, Clock};

/// Builds article items from titles.
#[must_use]
pub fn articles(titles: &[&str]) -> Vec<Item> {
    titles.iter().map(|t| Item::article(*t)).collect()
}

/// Streams the given items, in order.
#[must_use]
pub fn item_stream(items: Vec<Item>) -> ItemStream<'static> {
    stream::iter(items.into_iter().map(Ok)).boxed()
}

/// Streams the given results, in order, so a source failure can be staged.
#[must_use]
pub fn result_stream(results: Vec<GapResult<Item>>) -> ItemStream<'static> {
    stream::iter(results).boxed()
}

/// A clock that only moves when told to.
///
/// With a step configured, every reading advances the clock by that step
/// after returning the current instant.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
    step: Duration,
}

impl ManualClock {
    /// Creates a frozen clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_step(Duration::ZERO)
    }

    /// Creates a clock advancing by `step` on every reading.
    #[must_use]
    pub fn with_step(step: Duration) -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            step,
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let mut now = self.now.lock();
        let current = *now;
        *now += self.step;
        current
    }
}

/// A checkpoint action keeping every snapshot it receives.
#[derive(Debug, Default)]
pub struct RecordingCheckpoint {
    snapshots: Mutex<Vec<RunSnapshot>>,
    fail_at: Option<usize>,
}

impl RecordingCheckpoint {
    /// Creates an action that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an action failing on the checkpoint with this sequence number.
    #[must_use]
    pub fn failing_at(sequence: usize) -> Self {
        Self {
            snapshots: Mutex::default(),
            fail_at: Some(sequence),
        }
    }

    /// Snapshots received so far, failed one included.
    #[must_use]
    pub fn snapshots(&self) -> Vec<RunSnapshot> {
        self.snapshots.lock().clone()
    }

    /// The last snapshot received.
    #[must_use]
    pub fn last(&self) -> Option<RunSnapshot> {
        self.snapshots.lock().last().cloned()
    }
}

#[async_trait]
impl CheckpointAction for RecordingCheckpoint {
    async fn on_checkpoint(&self, snapshot: &RunSnapshot) -> GapResult<()> {
        self.snapshots.lock().push(snapshot.clone());
        if self.fail_at == Some(snapshot.sequence) {
            return Err(GapError::upstream("save", "report page is protected"));
        }
        Ok(())
    }
}
