//! Streaming filter/rank engine with time-boxed checkpoints.

use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::checkpoint::Checkpoint;
use super::clock::{Clock, SystemClock};
use crate::core::{sort_by_score_desc, Item, RankedItem, RunSnapshot};
use crate::corpus::ItemStream;
use crate::errors::{GapError, GapResult};
use crate::evaluation::Evaluator;
use crate::filters::ItemFilter;
use crate::observability::{NoOpRunObserver, RunObserver, SpanTimer};
use crate::utils::now_utc;

/// Mutable state of one run. Never leaves the engine.
struct RunState {
    run_id: Uuid,
    total_seen: usize,
    total_filtered: usize,
    ranked: Vec<RankedItem>,
    last_checkpoint: Instant,
    checkpoints: usize,
}

impl RunState {
    fn new(started_at: Instant) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            total_seen: 0,
            total_filtered: 0,
            ranked: Vec::new(),
            last_checkpoint: started_at,
            checkpoints: 0,
        }
    }

    /// Sorts the ranking and captures it.
    fn snapshot(&mut self, is_final: bool) -> RunSnapshot {
        sort_by_score_desc(&mut self.ranked);
        self.checkpoints += 1;
        RunSnapshot {
            run_id: self.run_id,
            total_seen: self.total_seen,
            total_filtered: self.total_filtered,
            ranked: self.ranked.clone(),
            sequence: self.checkpoints,
            is_final,
            taken_at: now_utc(),
        }
    }
}

/// Drives an item stream through filters and an evaluator.
///
/// Runs are sequential: each item is fully filtered, scored and, when due,
/// checkpointed before the next one is pulled.
#[derive(Clone)]
pub struct PipelineEngine {
    observer: Arc<dyn RunObserver>,
    clock: Arc<dyn Clock>,
}

impl PipelineEngine {
    /// Creates an engine reporting to `observer`, timed by the system clock.
    pub fn new(observer: Arc<dyn RunObserver>) -> Self {
        Self {
            observer,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs the pipeline to completion.
    ///
    /// An item survives when every filter keeps it; filters after the first
    /// rejection are not consulted. Survivors are scored as soon as they
    /// pass. Whenever strictly more than `checkpoint.interval` has elapsed
    /// since the previous checkpoint (or the start), the ranking is sorted
    /// and handed to the action before the next item is pulled. Once the
    /// stream ends a final checkpoint always fires, and its snapshot is
    /// returned.
    ///
    /// Source, filter and evaluator errors abort the run unchanged. Action
    /// errors abort it as [`GapError::CheckpointAction`]; reports saved by
    /// earlier checkpoints are left in place.
    pub async fn run(
        &self,
        items: ItemStream<'_>,
        filters: &[Arc<dyn ItemFilter>],
        evaluator: &dyn Evaluator,
        checkpoint: &Checkpoint,
    ) -> GapResult<RunSnapshot> {
        let timer = SpanTimer::start("pipeline_run");
        let mut state = RunState::new(self.clock.now());
        let run_id = state.run_id;
        tracing::info!(%run_id, interval_secs = checkpoint.interval.as_secs_f64(), "Run started");

        match self
            .drive(&mut state, items, filters, evaluator, checkpoint)
            .await
        {
            Ok(snapshot) => {
                self.observer.on_run_complete(&snapshot, timer.finish());
                Ok(snapshot)
            }
            Err(err) => {
                self.observer.on_run_failed(run_id, &err.to_string());
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        state: &mut RunState,
        mut items: ItemStream<'_>,
        filters: &[Arc<dyn ItemFilter>],
        evaluator: &dyn Evaluator,
        checkpoint: &Checkpoint,
    ) -> GapResult<RunSnapshot> {
        while let Some(item) = items.try_next().await? {
            state.total_seen += 1;
            self.observer.on_item_seen(state.run_id, &item);

            if !self.passes(state.run_id, &item, filters).await? {
                continue;
            }

            let score = evaluator.evaluate(&item).await?;
            let ranked = RankedItem::new(item.title, score);
            self.observer.on_item_ranked(state.run_id, &ranked);
            state.total_filtered += 1;
            state.ranked.push(ranked);

            let elapsed = self
                .clock
                .now()
                .saturating_duration_since(state.last_checkpoint);
            if checkpoint.is_due(elapsed) {
                self.fire(state, checkpoint, false).await?;
                state.last_checkpoint = self.clock.now();
            }
        }

        self.fire(state, checkpoint, true).await
    }

    async fn passes(
        &self,
        run_id: Uuid,
        item: &Item,
        filters: &[Arc<dyn ItemFilter>],
    ) -> GapResult<bool> {
        for filter in filters {
            if !filter.keep(item).await? {
                self.observer.on_item_rejected(run_id, item, filter.name());
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn fire(
        &self,
        state: &mut RunState,
        checkpoint: &Checkpoint,
        is_final: bool,
    ) -> GapResult<RunSnapshot> {
        let snapshot = state.snapshot(is_final);
        self.observer.on_checkpoint(&snapshot);
        checkpoint
            .action
            .on_checkpoint(&snapshot)
            .await
            .map_err(GapError::checkpoint)?;
        Ok(snapshot)
    }
}

impl Default for PipelineEngine {
    fn default() -> Self {
        Self::new(Arc::new(NoOpRunObserver))
    }
}

impl std::fmt::Debug for PipelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEngine").finish_non_exhaustive()
    }
}
