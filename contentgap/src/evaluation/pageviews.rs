//! Page-view based ranking.

use async_trait::async_trait;
use std::sync::Arc;

use super::Evaluator;
use crate::client::{PopularityProvider, ViewWindow};
use crate::core::Item;
use crate::errors::GapResult;

/// Scores an item by its views over a trailing window.
#[derive(Clone)]
pub struct PageViewEvaluator {
    provider: Arc<dyn PopularityProvider>,
    window: ViewWindow,
}

impl PageViewEvaluator {
    /// Creates an evaluator over `window`.
    pub fn new(provider: Arc<dyn PopularityProvider>, window: ViewWindow) -> Self {
        Self { provider, window }
    }

    /// The window in use.
    #[must_use]
    pub const fn window(&self) -> ViewWindow {
        self.window
    }
}

#[async_trait]
impl Evaluator for PageViewEvaluator {
    async fn evaluate(&self, item: &Item) -> GapResult<i64> {
        let views = self
            .provider
            .views_over_window(&item.title, self.window.days())
            .await?;
        Ok(i64::try_from(views).unwrap_or(i64::MAX))
    }
}

impl std::fmt::Debug for PageViewEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageViewEvaluator")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
