//! In-memory collaborators for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::client::{
    Authenticator, CorpusProvider, Credentials, FeedProvider, ListingPage, PageWriter,
    PopularityProvider, ViewWindow,
};
use crate::core::Item;
use crate::errors::{GapError, GapResult};
use crate::utils::Timestamp;

/// A call received by [`InMemoryWiki`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiCall {
    /// `fetch_children(category)`.
    FetchChildren(String),
    /// `fetch_content(title)`.
    FetchContent(String),
    /// `list_by_template(template, cursor)`.
    ListByTemplate(String, Option<String>),
    /// `random_titles(limit)`.
    RandomTitles(usize),
    /// `latest_change()`.
    LatestChange,
    /// `changed_titles_since(since)`.
    ChangedSince(Timestamp),
    /// `write(location, ..)`.
    Write(String),
    /// `login(user)`.
    Login(String),
}

/// A wiki held in memory, recording every call it receives.
#[derive(Debug, Default)]
pub struct InMemoryWiki {
    categories: HashMap<String, Vec<Item>>,
    contents: HashMap<String, String>,
    template_pages: HashMap<String, Vec<ListingPage>>,
    random_batches: Mutex<VecDeque<Vec<String>>>,
    changes: Vec<(Timestamp, String)>,
    failing_categories: HashSet<String>,
    failing_contents: HashSet<String>,
    failing_template_page: Option<usize>,
    writes_before_failure: Option<usize>,
    reject_login: bool,
    pages: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<WikiCall>>>,
}

impl InMemoryWiki {
    /// Creates an empty wiki.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the children of a category.
    #[must_use]
    pub fn with_category(mut self, name: impl Into<String>, children: Vec<Item>) -> Self {
        self.categories.insert(name.into(), children);
        self
    }

    /// Sets the wikitext of a page.
    #[must_use]
    pub fn with_content(mut self, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.contents.insert(title.into(), text.into());
        self
    }

    /// Sets the listing pages of a template. Page *n+1* is served for the
    /// cursor carried by page *n*.
    #[must_use]
    pub fn with_template_pages(mut self, template: impl Into<String>, pages: Vec<ListingPage>) -> Self {
        self.template_pages.insert(template.into(), pages);
        self
    }

    /// Queues a batch answered by the next `random_titles` call.
    #[must_use]
    pub fn with_random_batch(self, titles: &[&str]) -> Self {
        self.random_batches
            .lock()
            .push_back(titles.iter().map(ToString::to_string).collect());
        self
    }

    /// Records a change of `title` at `at`. Record newest first.
    #[must_use]
    pub fn with_change(mut self, at: Timestamp, title: impl Into<String>) -> Self {
        self.changes.push((at, title.into()));
        self
    }

    /// Makes listing `name` fail.
    #[must_use]
    pub fn failing_category(mut self, name: impl Into<String>) -> Self {
        self.failing_categories.insert(name.into());
        self
    }

    /// Makes fetching the content of `title` fail.
    #[must_use]
    pub fn failing_content(mut self, title: impl Into<String>) -> Self {
        self.failing_contents.insert(title.into());
        self
    }

    /// Makes the template listing page at `index` (0-based) fail.
    #[must_use]
    pub const fn failing_template_page(mut self, index: usize) -> Self {
        self.failing_template_page = Some(index);
        self
    }

    /// Lets `count` writes succeed, then fails every later one.
    #[must_use]
    pub const fn failing_writes_after(mut self, count: usize) -> Self {
        self.writes_before_failure = Some(count);
        self
    }

    /// Rejects every login attempt.
    #[must_use]
    pub const fn rejecting_login(mut self) -> Self {
        self.reject_login = true;
        self
    }

    /// Shared handle on the recorded calls.
    #[must_use]
    pub fn calls(&self) -> Arc<Mutex<Vec<WikiCall>>> {
        Arc::clone(&self.calls)
    }

    /// Shared handle on the pages written so far.
    #[must_use]
    pub fn pages(&self) -> Arc<Mutex<HashMap<String, String>>> {
        Arc::clone(&self.pages)
    }

    fn record(&self, call: WikiCall) {
        self.calls.lock().push(call);
    }

    fn count(&self, pred: impl Fn(&WikiCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl CorpusProvider for InMemoryWiki {
    async fn fetch_children(&self, category: &str) -> GapResult<Vec<Item>> {
        self.record(WikiCall::FetchChildren(category.to_string()));
        if self.failing_categories.contains(category) {
            return Err(GapError::upstream("fetch_children", format!("cannot list {category}")));
        }
        Ok(self.categories.get(category).cloned().unwrap_or_default())
    }

    async fn fetch_content(&self, title: &str) -> GapResult<String> {
        self.record(WikiCall::FetchContent(title.to_string()));
        if self.failing_contents.contains(title) {
            return Err(GapError::upstream("fetch_content", format!("cannot read {title}")));
        }
        Ok(self.contents.get(title).cloned().unwrap_or_default())
    }

    async fn list_by_template(
        &self,
        template: &str,
        cursor: Option<String>,
    ) -> GapResult<ListingPage> {
        self.record(WikiCall::ListByTemplate(template.to_string(), cursor.clone()));
        let Some(pages) = self.template_pages.get(template) else {
            return Ok(ListingPage::default());
        };
        let index = match &cursor {
            None => 0,
            Some(c) => pages
                .iter()
                .position(|p| p.next_cursor.as_deref() == Some(c.as_str()))
                .map(|i| i + 1)
                .ok_or_else(|| GapError::upstream("list_by_template", format!("unknown cursor {c}")))?,
        };
        if self.failing_template_page == Some(index) {
            return Err(GapError::upstream("list_by_template", format!("page {index} unavailable")));
        }
        pages
            .get(index)
            .cloned()
            .ok_or_else(|| GapError::upstream("list_by_template", "no such page"))
    }
}

#[async_trait]
impl FeedProvider for InMemoryWiki {
    async fn random_titles(&self, limit: usize) -> GapResult<Vec<String>> {
        self.record(WikiCall::RandomTitles(limit));
        let mut batch = self.random_batches.lock().pop_front().unwrap_or_default();
        batch.truncate(limit);
        Ok(batch)
    }

    async fn latest_change(&self) -> GapResult<Option<Timestamp>> {
        self.record(WikiCall::LatestChange);
        Ok(self.changes.first().map(|(at, _)| *at))
    }

    async fn changed_titles_since(&self, since: Timestamp) -> GapResult<Vec<String>> {
        self.record(WikiCall::ChangedSince(since));
        Ok(self
            .changes
            .iter()
            .filter(|(at, _)| *at >= since)
            .map(|(_, title)| title.clone())
            .collect())
    }
}

#[async_trait]
impl PageWriter for InMemoryWiki {
    async fn write(&self, location: &str, text: &str, _summary: &str) -> GapResult<()> {
        let previous = self.count(|c| matches!(c, WikiCall::Write(_)));
        self.record(WikiCall::Write(location.to_string()));
        if self.writes_before_failure.is_some_and(|limit| previous >= limit) {
            return Err(GapError::upstream("save", "edit conflict"));
        }
        self.pages.lock().insert(location.to_string(), text.to_string());
        Ok(())
    }
}

#[async_trait]
impl Authenticator for InMemoryWiki {
    async fn login(&self, credentials: &Credentials) -> GapResult<()> {
        self.record(WikiCall::Login(credentials.user.clone()));
        if self.reject_login {
            return Err(GapError::upstream("login", "WrongPass"));
        }
        Ok(())
    }
}

/// Page views served from a fixed table.
#[derive(Debug, Default)]
pub struct FixedPopularity {
    views: HashMap<String, u64>,
    missing: HashSet<String>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl FixedPopularity {
    /// Creates an empty table; unknown titles have 0 views.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the views of a title.
    #[must_use]
    pub fn with_views(mut self, title: impl Into<String>, views: u64) -> Self {
        self.views.insert(title.into(), views);
        self
    }

    /// Answers requests for `title` without a view series.
    #[must_use]
    pub fn without_data(mut self, title: impl Into<String>) -> Self {
        self.missing.insert(title.into());
        self
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PopularityProvider for FixedPopularity {
    async fn views_over_window(&self, title: &str, window_days: u32) -> GapResult<u64> {
        ViewWindow::try_from(window_days)?;
        self.requests.lock().push((title.to_string(), window_days));
        if self.missing.contains(title) {
            return Err(GapError::missing_data("items"));
        }
        Ok(self.views.get(title).copied().unwrap_or(0))
    }
}
