//! Depth-bounded category traversal.

use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

use crate::client::CorpusProvider;
use crate::core::Item;
use crate::errors::GapResult;
use crate::observability::RunObserver;

/// Collects the articles of a category and of its sub-categories.
#[derive(Clone)]
pub struct CategorySource {
    provider: Arc<dyn CorpusProvider>,
    observer: Arc<dyn RunObserver>,
}

impl CategorySource {
    /// Creates a category source.
    pub fn new(provider: Arc<dyn CorpusProvider>, observer: Arc<dyn RunObserver>) -> Self {
        Self { provider, observer }
    }

    /// Lists the articles of `category` down to `depth` levels of
    /// sub-categories (0 = the category alone).
    ///
    /// Sub-category results follow the parent's own articles, in the order
    /// the sub-categories were listed. Articles reachable through several
    /// sub-categories appear once per path. The first failed listing aborts
    /// the whole search.
    pub async fn search(&self, category: &str, depth: u32) -> GapResult<Vec<Item>> {
        search_category(self.provider.as_ref(), self.observer.as_ref(), category, depth).await
    }
}

impl std::fmt::Debug for CategorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategorySource").finish_non_exhaustive()
    }
}

fn search_category<'a>(
    provider: &'a dyn CorpusProvider,
    observer: &'a dyn RunObserver,
    category: &'a str,
    depth: u32,
) -> BoxFuture<'a, GapResult<Vec<Item>>> {
    async move {
        observer.on_corpus_visit(category, depth);
        let children = provider.fetch_children(category).await?;

        let mut articles = Vec::new();
        let mut subcategories = Vec::new();
        for child in children {
            if child.is_article() {
                articles.push(child);
            } else if child.is_category() {
                subcategories.push(child);
            }
        }

        if depth > 0 {
            for sub in &subcategories {
                let nested = search_category(provider, observer, &sub.title, depth - 1).await?;
                articles.extend(nested);
            }
        }
        Ok(articles)
    }
    .boxed()
}
