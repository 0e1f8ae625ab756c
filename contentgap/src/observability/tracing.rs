//! Run observers and span timing.
//!
//! Observers are injected into the engine and the corpus sources at
//! construction. Per-item hooks are meant for `debug` output, run-level hooks
//! for `info`.

use crate::core::{Item, RankedItem, RunSnapshot};
use parking_lot::RwLock;
use std::time::Instant;
use uuid::Uuid;

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

/// Callbacks describing the progress of discovery and pipeline runs.
///
/// All hooks have empty default bodies.
pub trait RunObserver: Send + Sync {
    /// A category is being listed at the given remaining depth.
    fn on_corpus_visit(&self, _category: &str, _remaining_depth: u32) {}

    /// A listing page was fetched.
    fn on_page_fetched(&self, _source: &str, _page: usize, _titles: usize, _has_more: bool) {}

    /// An item was pulled from the source.
    fn on_item_seen(&self, _run_id: Uuid, _item: &Item) {}

    /// An item was rejected by the named filter.
    fn on_item_rejected(&self, _run_id: Uuid, _item: &Item, _filter: &str) {}

    /// An item survived every filter and was scored.
    fn on_item_ranked(&self, _run_id: Uuid, _ranked: &RankedItem) {}

    /// A checkpoint action is about to run.
    fn on_checkpoint(&self, _snapshot: &RunSnapshot) {}

    /// The run finished and its final checkpoint succeeded.
    fn on_run_complete(&self, _snapshot: &RunSnapshot, _duration_ms: f64) {}

    /// The run was aborted.
    fn on_run_failed(&self, _run_id: Uuid, _error: &str) {}
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRunObserver;

impl RunObserver for NoOpRunObserver {}

/// Observer that logs through the tracing framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingRunObserver;

impl RunObserver for LoggingRunObserver {
    fn on_corpus_visit(&self, category: &str, remaining_depth: u32) {
        tracing::info!(category, remaining_depth, "Searching for articles in category");
    }

    fn on_page_fetched(&self, source: &str, page: usize, titles: usize, has_more: bool) {
        tracing::info!(source, page, titles, has_more, "Listing page fetched");
    }

    fn on_item_seen(&self, run_id: Uuid, item: &Item) {
        tracing::debug!(%run_id, title = %item.title, "Analyzing item");
    }

    fn on_item_rejected(&self, run_id: Uuid, item: &Item, filter: &str) {
        tracing::debug!(%run_id, title = %item.title, filter, "Item filtered out");
    }

    fn on_item_ranked(&self, run_id: Uuid, ranked: &RankedItem) {
        tracing::debug!(%run_id, title = %ranked.title, score = ranked.score, "Item ranked");
    }

    fn on_checkpoint(&self, snapshot: &RunSnapshot) {
        tracing::info!(
            run_id = %snapshot.run_id,
            sequence = snapshot.sequence,
            is_final = snapshot.is_final,
            total_seen = snapshot.total_seen,
            total_filtered = snapshot.total_filtered,
            "Checkpoint"
        );
    }

    fn on_run_complete(&self, snapshot: &RunSnapshot, duration_ms: f64) {
        tracing::info!(
            run_id = %snapshot.run_id,
            total_seen = snapshot.total_seen,
            total_filtered = snapshot.total_filtered,
            checkpoints = snapshot.sequence,
            duration_ms,
            "Finished, found {} matching items out of {}",
            snapshot.total_filtered,
            snapshot.total_seen
        );
    }

    fn on_run_failed(&self, run_id: Uuid, error: &str) {
        tracing::error!(%run_id, error, "Run aborted");
    }
}

/// An event recorded by [`CollectingRunObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    /// A category visit.
    CorpusVisit(String, u32),
    /// A listing page fetch.
    PageFetched(String, usize),
    /// An item pulled from the source.
    Seen(String),
    /// An item rejected by a filter.
    Rejected(String, String),
    /// An item scored.
    Ranked(String, i64),
    /// A checkpoint with its sequence number and final flag.
    Checkpoint(usize, bool),
    /// The run completed.
    Completed,
    /// The run failed.
    Failed(String),
}

/// A collecting observer for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingRunObserver {
    events: RwLock<Vec<ObservedEvent>>,
}

impl CollectingRunObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.write().push(event);
    }
}

impl RunObserver for CollectingRunObserver {
    fn on_corpus_visit(&self, category: &str, remaining_depth: u32) {
        self.push(ObservedEvent::CorpusVisit(category.to_string(), remaining_depth));
    }

    fn on_page_fetched(&self, source: &str, page: usize, _titles: usize, _has_more: bool) {
        self.push(ObservedEvent::PageFetched(source.to_string(), page));
    }

    fn on_item_seen(&self, _run_id: Uuid, item: &Item) {
        self.push(ObservedEvent::Seen(item.title.clone()));
    }

    fn on_item_rejected(&self, _run_id: Uuid, item: &Item, filter: &str) {
        self.push(ObservedEvent::Rejected(item.title.clone(), filter.to_string()));
    }

    fn on_item_ranked(&self, _run_id: Uuid, ranked: &RankedItem) {
        self.push(ObservedEvent::Ranked(ranked.title.clone(), ranked.score));
    }

    fn on_checkpoint(&self, snapshot: &RunSnapshot) {
        self.push(ObservedEvent::Checkpoint(snapshot.sequence, snapshot.is_final));
    }

    fn on_run_complete(&self, _snapshot: &RunSnapshot, _duration_ms: f64) {
        self.push(ObservedEvent::Completed);
    }

    fn on_run_failed(&self, _run_id: Uuid, error: &str) {
        self.push(ObservedEvent::Failed(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("test_span");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(timer.name(), "test_span");
        let duration = timer.finish();
        assert!(duration >= 10.0);
    }

    #[test]
    fn test_noop_and_logging_observers() {
        let item = Item::article("Paris");
        let run_id = Uuid::new_v4();
        let observers: [&dyn RunObserver; 2] = [&NoOpRunObserver, &LoggingRunObserver];
        for observer in observers {
            observer.on_corpus_visit("Category:Cities", 1);
            observer.on_item_seen(run_id, &item);
            observer.on_item_rejected(run_id, &item, "missing_image");
            observer.on_run_failed(run_id, "boom");
        }
        // Should not panic
    }

    #[test]
    fn test_collecting_observer() {
        let observer = CollectingRunObserver::new();
        assert!(observer.is_empty());

        let run_id = Uuid::new_v4();
        observer.on_item_seen(run_id, &Item::article("A"));
        observer.on_item_ranked(run_id, &RankedItem::new("A", 3));

        assert_eq!(observer.len(), 2);
        assert_eq!(
            observer.events(),
            vec![
                ObservedEvent::Seen("A".to_string()),
                ObservedEvent::Ranked("A".to_string(), 3),
            ]
        );
    }
}
