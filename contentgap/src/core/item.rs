//! Items, namespaces and ranked results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MediaWiki namespace id of articles.
pub const ARTICLE_NAMESPACE_ID: i64 = 0;

/// MediaWiki namespace id of categories.
pub const CATEGORY_NAMESPACE_ID: i64 = 14;

/// The namespace of a listed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// A content article.
    Article,
    /// A category, traversed as a sub-corpus.
    Category,
    /// Any other namespace; discarded during traversal.
    Other(i64),
}

impl Namespace {
    /// Maps a MediaWiki namespace id.
    #[must_use]
    pub const fn from_id(id: i64) -> Self {
        match id {
            ARTICLE_NAMESPACE_ID => Self::Article,
            CATEGORY_NAMESPACE_ID => Self::Category,
            other => Self::Other(other),
        }
    }

    /// Returns the MediaWiki namespace id.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Article => ARTICLE_NAMESPACE_ID,
            Self::Category => CATEGORY_NAMESPACE_ID,
            Self::Other(id) => id,
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::Article
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => write!(f, "article"),
            Self::Category => write!(f, "category"),
            Self::Other(id) => write!(f, "ns{id}"),
        }
    }
}

/// A discoverable page. Its content is fetched on demand through a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Page title, unique within a run.
    pub title: String,
    /// Namespace the page belongs to.
    #[serde(default)]
    pub namespace: Namespace,
}

impl Item {
    /// Creates an item in the given namespace.
    #[must_use]
    pub fn new(title: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            title: title.into(),
            namespace,
        }
    }

    /// Creates an article item.
    #[must_use]
    pub fn article(title: impl Into<String>) -> Self {
        Self::new(title, Namespace::Article)
    }

    /// Creates a category item.
    #[must_use]
    pub fn category(title: impl Into<String>) -> Self {
        Self::new(title, Namespace::Category)
    }

    /// Whether the item is a content article.
    #[must_use]
    pub fn is_article(&self) -> bool {
        self.namespace == Namespace::Article
    }

    /// Whether the item is a sub-corpus.
    #[must_use]
    pub fn is_category(&self) -> bool {
        self.namespace == Namespace::Category
    }
}

/// An item that survived the filters, with its score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    /// Page title.
    pub title: String,
    /// Rank value, e.g. page views over a window.
    pub score: i64,
}

impl RankedItem {
    /// Creates a ranked item.
    #[must_use]
    pub fn new(title: impl Into<String>, score: i64) -> Self {
        Self {
            title: title.into(),
            score,
        }
    }
}

/// Stably sorts ranked items by score, highest first.
///
/// Items with equal scores keep their encounter order.
pub fn sort_by_score_desc(items: &mut [RankedItem]) {
    items.sort_by(|a, b| b.score.cmp(&a.score));
}
