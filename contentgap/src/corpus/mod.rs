//! Corpus sources: where candidate items come from.
//!
//! Every source can be turned into an [`ItemStream`] through
//! [`open_source`], which is what the pipeline engine consumes.

mod category;
mod feed;
mod template;

pub use category::CategorySource;
pub use feed::FeedSource;
pub use template::{normalize_template_name, TemplateListing};

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::client::{CorpusProvider, FeedProvider, WikiClient};
use crate::core::Item;
use crate::errors::{GapError, GapResult};
use crate::observability::RunObserver;

/// A fallible, forward-only sequence of items.
pub type ItemStream<'a> = BoxStream<'a, GapResult<Item>>;

/// Which items a run scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CorpusQuery {
    /// Articles of a category and of its sub-categories down to `depth`.
    Category {
        /// Category name, with or without the `Category:` prefix.
        name: String,
        /// Sub-category levels to descend; 0 lists the category alone.
        depth: u32,
    },
    /// Articles transcluding a template.
    Template {
        /// Template name, with or without the `Template:` prefix.
        name: String,
    },
    /// Distinct random articles.
    Random {
        /// Number of articles.
        count: usize,
    },
    /// Articles changed during the hours before the latest change.
    RecentChanges {
        /// Width of the window, in hours.
        hours: u32,
    },
}

impl CorpusQuery {
    /// Command kinds accepted by [`CorpusQuery::from_command`].
    pub const COMMAND_KINDS: [&'static str; 2] = ["Category", "Template"];

    /// Builds a query from a `Category` or `Template` command. Category
    /// commands list the category alone.
    pub fn from_command(kind: &str, argument: &str) -> GapResult<Self> {
        match kind {
            "Category" => Ok(Self::Category {
                name: argument.to_string(),
                depth: 0,
            }),
            "Template" => Ok(Self::Template {
                name: argument.to_string(),
            }),
            other => Err(GapError::invalid_configuration(format!(
                "Command value should be in {:?}, was {other}",
                Self::COMMAND_KINDS
            ))),
        }
    }
}

impl fmt::Display for CorpusQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category { name, depth } => write!(f, "category {name} (depth {depth})"),
            Self::Template { name } => write!(f, "template {name}"),
            Self::Random { count } => write!(f, "{count} random articles"),
            Self::RecentChanges { hours } => write!(f, "recent changes ({hours}h)"),
        }
    }
}

/// Streams a batch computed by one future.
fn deferred<F>(batch: F) -> ItemStream<'static>
where
    F: std::future::Future<Output = GapResult<Vec<Item>>> + Send + 'static,
{
    stream::once(batch)
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<Item, GapError>)))
        .try_flatten()
        .boxed()
}

/// Opens the item stream of a query.
///
/// Nothing is requested from the wiki before the stream is first polled.
pub fn open_source<C>(
    query: &CorpusQuery,
    client: Arc<C>,
    observer: Arc<dyn RunObserver>,
) -> ItemStream<'static>
where
    C: WikiClient + 'static,
{
    match query.clone() {
        CorpusQuery::Category { name, depth } => {
            let provider: Arc<dyn CorpusProvider> = client;
            let source = CategorySource::new(provider, observer);
            deferred(async move { source.search(&name, depth).await })
        }
        CorpusQuery::Template { name } => {
            let provider: Arc<dyn CorpusProvider> = client;
            TemplateListing::new(provider, observer, &name).items()
        }
        CorpusQuery::Random { count } => {
            let feed: Arc<dyn FeedProvider> = client;
            let source = FeedSource::new(feed, observer);
            deferred(async move { source.random_articles(count).await })
        }
        CorpusQuery::RecentChanges { hours } => {
            let feed: Arc<dyn FeedProvider> = client;
            let source = FeedSource::new(feed, observer);
            deferred(async move { source.recently_changed_articles(hours).await })
        }
    }
}
