//! Collaborator interfaces and their HTTP adapters.
//!
//! The pipeline only talks to the traits defined here. The `mediawiki`
//! feature provides adapters for the MediaWiki Action API and the Wikimedia
//! page-view REST API.

mod config;
#[cfg(feature = "mediawiki")]
mod mediawiki;
#[cfg(feature = "mediawiki")]
mod pageviews;
mod window;

pub use config::{ClientConfig, Credentials};
#[cfg(feature = "mediawiki")]
pub use mediawiki::MediaWikiClient;
#[cfg(feature = "mediawiki")]
pub use pageviews::PageviewsClient;
pub use window::ViewWindow;

use crate::core::Item;
use crate::errors::GapResult;
use crate::utils::Timestamp;
use async_trait::async_trait;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Titles on this page, in listing order.
    pub titles: Vec<String>,
    /// Cursor of the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}

impl ListingPage {
    /// Creates a page.
    #[must_use]
    pub fn new(titles: Vec<String>, next_cursor: Option<String>) -> Self {
        Self {
            titles,
            next_cursor,
        }
    }

    /// Whether another page follows.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Source of corpus structure and item content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    /// Lists every direct child of a category, following the provider's own
    /// pagination.
    async fn fetch_children(&self, category: &str) -> GapResult<Vec<Item>>;

    /// Fetches the wikitext of a page.
    async fn fetch_content(&self, title: &str) -> GapResult<String>;

    /// Fetches one page of articles transcluding `template`.
    async fn list_by_template(
        &self,
        template: &str,
        cursor: Option<String>,
    ) -> GapResult<ListingPage>;
}

/// Source of random articles and recent changes.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Returns up to `limit` random article titles. Repeats are possible.
    async fn random_titles(&self, limit: usize) -> GapResult<Vec<String>>;

    /// Timestamp of the most recent article change, if any.
    async fn latest_change(&self) -> GapResult<Option<Timestamp>>;

    /// Titles of articles changed since `since`, newest first.
    /// A title appears once per change.
    async fn changed_titles_since(&self, since: Timestamp) -> GapResult<Vec<String>>;
}

/// Page-view statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PopularityProvider: Send + Sync {
    /// Total views of `title` over the trailing `window_days` days.
    ///
    /// Fails with `InvalidConfiguration` unless the window is 30, 60 or 90,
    /// and with `MissingData` when the response lacks the view series.
    async fn views_over_window(&self, title: &str, window_days: u32) -> GapResult<u64>;
}

/// Writes page content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageWriter: Send + Sync {
    /// Overwrites `location` with `text`, unconditionally.
    async fn write(&self, location: &str, text: &str, summary: &str) -> GapResult<()>;
}

/// Opens an authenticated session.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Logs in; credential checks are entirely up to the remote side.
    async fn login(&self, credentials: &Credentials) -> GapResult<()>;
}

/// Everything the bot needs from a wiki.
pub trait WikiClient: CorpusProvider + FeedProvider + PageWriter + Authenticator {}

impl<T> WikiClient for T where T: CorpusProvider + FeedProvider + PageWriter + Authenticator {}
