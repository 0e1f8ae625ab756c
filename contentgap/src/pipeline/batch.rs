//! Filter-everything-then-rank analysis over a fixed item list.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::{sort_by_score_desc, Item, RankedItem};
use crate::errors::{GapError, GapResult};
use crate::evaluation::Evaluator;
use crate::filters::ItemFilter;

/// Counters of a [`ContentGap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapMetadata {
    /// Items under analysis.
    pub articles: usize,
    /// Items that passed the filters, once filtered.
    pub filtered: Option<usize>,
}

/// Batch content gap over a list of items.
///
/// Unlike [`PipelineEngine`](super::PipelineEngine), each filter runs over the
/// whole list before the next one, and nothing is checkpointed.
#[derive(Debug, Clone, Default)]
pub struct ContentGap {
    items: Vec<Item>,
    filtered: Option<Vec<Item>>,
    ranked: Option<Vec<RankedItem>>,
}

impl ContentGap {
    /// Creates an analysis over `items`.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            filtered: None,
            ranked: None,
        }
    }

    /// Items under analysis.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Filtered items, once filtered.
    #[must_use]
    pub fn filtered(&self) -> Option<&[Item]> {
        self.filtered.as_deref()
    }

    /// Ranked items, once ranked.
    #[must_use]
    pub fn ranked(&self) -> Option<&[RankedItem]> {
        self.ranked.as_deref()
    }

    /// Applies `filters` one after the other. With no filter every item
    /// survives. A filter error leaves the previous state untouched.
    pub async fn filter_items(&mut self, filters: &[Arc<dyn ItemFilter>]) -> GapResult<&[Item]> {
        let mut kept = self.items.clone();
        for filter in filters {
            let mut survivors = Vec::with_capacity(kept.len());
            for item in kept {
                if filter.keep(&item).await? {
                    survivors.push(item);
                }
            }
            kept = survivors;
        }
        self.ranked = None;
        Ok(self.filtered.insert(kept).as_slice())
    }

    /// Scores the filtered items.
    ///
    /// Without an evaluator every item scores 0 and filter order is kept;
    /// otherwise the ranking is sorted by score, highest first.
    pub async fn rank_items(
        &mut self,
        evaluator: Option<&dyn Evaluator>,
    ) -> GapResult<&[RankedItem]> {
        let filtered = self.filtered.as_ref().ok_or(GapError::FilterNotYetRun)?;
        let mut ranked = Vec::with_capacity(filtered.len());
        match evaluator {
            None => ranked.extend(filtered.iter().map(|i| RankedItem::new(i.title.clone(), 0))),
            Some(evaluator) => {
                for item in filtered {
                    ranked.push(RankedItem::new(item.title.clone(), evaluator.evaluate(item).await?));
                }
                sort_by_score_desc(&mut ranked);
            }
        }
        Ok(self.ranked.insert(ranked).as_slice())
    }

    /// Forgets filtering and ranking.
    pub fn reset(&mut self) {
        self.filtered = None;
        self.ranked = None;
    }

    /// Current counters.
    #[must_use]
    pub fn metadata(&self) -> GapMetadata {
        GapMetadata {
            articles: self.items.len(),
            filtered: self.filtered.as_ref().map(Vec::len),
        }
    }
}
