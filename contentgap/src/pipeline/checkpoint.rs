//! Checkpoint configuration.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::RunSnapshot;
use crate::errors::GapResult;

/// Work done with a snapshot of the run, e.g. persisting a report.
///
/// Actions run inline: the engine pulls no further item until the action
/// returns.
#[async_trait]
pub trait CheckpointAction: Send + Sync {
    /// Handles one snapshot. An error aborts the run.
    async fn on_checkpoint(&self, snapshot: &RunSnapshot) -> GapResult<()>;
}

/// When and how to checkpoint a run.
#[derive(Clone)]
pub struct Checkpoint {
    /// Minimum time between two inline checkpoints.
    pub interval: Duration,
    /// Action receiving each snapshot.
    pub action: Arc<dyn CheckpointAction>,
}

impl Checkpoint {
    /// Creates a checkpoint.
    pub fn new(interval: Duration, action: Arc<dyn CheckpointAction>) -> Self {
        Self { interval, action }
    }

    /// Checkpoint firing every `seconds`.
    pub fn every_secs(seconds: u64, action: Arc<dyn CheckpointAction>) -> Self {
        Self::new(Duration::from_secs(seconds), action)
    }

    /// Whether `elapsed` since the last checkpoint is strictly past the
    /// interval.
    #[must_use]
    pub fn is_due(&self, elapsed: Duration) -> bool {
        elapsed > self.interval
    }
}

impl fmt::Debug for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpoint")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ignore;

    #[async_trait]
    impl CheckpointAction for Ignore {
        async fn on_checkpoint(&self, _snapshot: &RunSnapshot) -> GapResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_is_due_is_strict() {
        let checkpoint = Checkpoint::every_secs(600, Arc::new(Ignore));
        assert!(!checkpoint.is_due(Duration::from_secs(599)));
        assert!(!checkpoint.is_due(Duration::from_secs(600)));
        assert!(checkpoint.is_due(Duration::from_millis(600_001)));
    }
}
