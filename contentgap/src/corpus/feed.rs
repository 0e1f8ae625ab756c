//! Random and recently changed articles.

use chrono::Duration;
use std::collections::HashSet;
use std::sync::Arc;

use crate::client::FeedProvider;
use crate::core::Item;
use crate::errors::GapResult;
use crate::observability::RunObserver;

/// Keeps the first occurrence of every title.
fn dedupe(titles: impl IntoIterator<Item = String>) -> Vec<Item> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .map(Item::article)
        .collect()
}

/// Articles taken from the wiki's random and recent-changes feeds.
#[derive(Clone)]
pub struct FeedSource {
    feed: Arc<dyn FeedProvider>,
    observer: Arc<dyn RunObserver>,
}

impl FeedSource {
    /// Creates a feed source.
    pub fn new(feed: Arc<dyn FeedProvider>, observer: Arc<dyn RunObserver>) -> Self {
        Self { feed, observer }
    }

    /// Collects `count` distinct random articles, in the order drawn.
    ///
    /// Batches are requested until enough distinct titles are gathered. A
    /// batch that adds no new title ends collection early with what was
    /// gathered, so a wiki with fewer articles than `count` cannot stall it.
    pub async fn random_articles(&self, count: usize) -> GapResult<Vec<Item>> {
        let mut seen = HashSet::with_capacity(count);
        let mut items = Vec::with_capacity(count);
        let mut batches = 0;

        while items.len() < count {
            let batch = self.feed.random_titles(count - items.len()).await?;
            batches += 1;
            let fetched = batch.len();
            let before = items.len();
            for title in batch {
                if items.len() == count {
                    break;
                }
                if seen.insert(title.clone()) {
                    items.push(Item::article(title));
                }
            }
            let exhausted = items.len() == before;
            self.observer
                .on_page_fetched("random", batches, fetched, !exhausted && items.len() < count);
            if exhausted {
                break;
            }
        }
        Ok(items)
    }

    /// Articles changed during the `hours` before the latest change, newest
    /// first, each title once.
    pub async fn recently_changed_articles(&self, hours: u32) -> GapResult<Vec<Item>> {
        let Some(latest) = self.feed.latest_change().await? else {
            return Ok(Vec::new());
        };
        let since = latest - Duration::hours(i64::from(hours));
        let titles = self.feed.changed_titles_since(since).await?;
        self.observer.on_page_fetched("recentchanges", 1, titles.len(), false);
        Ok(dedupe(titles))
    }
}

impl std::fmt::Debug for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSource").finish_non_exhaustive()
    }
}
