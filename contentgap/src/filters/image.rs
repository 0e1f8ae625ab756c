//! Image-presence detection.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::ItemFilter;
use crate::client::CorpusProvider;
use crate::core::Item;
use crate::errors::GapResult;

/// Substrings whose presence in wikitext means the page shows an image.
pub const IMAGE_PATTERNS: [&str; 15] = [
    "<gallery>", "File:", "Image:", ".jpg", ".JPG", ".gif", ".GIF", ".PNG", ".SVG", ".TIF",
    ".png", ".svg", ".tif", ".jpeg", ".JPEG",
];

/// Whether `text` contains any of [`IMAGE_PATTERNS`]. Case-sensitive.
#[must_use]
pub fn has_image(text: &str) -> bool {
    IMAGE_PATTERNS.iter().any(|pattern| text.contains(pattern))
}

/// Page content fetched during a run, by title.
#[derive(Debug, Default)]
pub struct ContentCache {
    pages: DashMap<String, Arc<str>>,
}

impl ContentCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached content of `title`, fetching it on first use.
    pub async fn get_or_fetch(
        &self,
        provider: &dyn CorpusProvider,
        title: &str,
    ) -> GapResult<Arc<str>> {
        if let Some(text) = self.pages.get(title) {
            return Ok(Arc::clone(text.value()));
        }
        let text: Arc<str> = provider.fetch_content(title).await?.into();
        self.pages.insert(title.to_string(), Arc::clone(&text));
        Ok(text)
    }

    /// Number of cached pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Drops every cached page.
    pub fn clear(&self) {
        self.pages.clear();
    }
}

/// Keeps the items whose content shows no image.
#[derive(Clone)]
pub struct MissingImageFilter {
    provider: Arc<dyn CorpusProvider>,
    cache: Arc<ContentCache>,
}

impl MissingImageFilter {
    /// Creates the filter with a fresh cache.
    pub fn new(provider: Arc<dyn CorpusProvider>) -> Self {
        Self::with_cache(provider, Arc::new(ContentCache::new()))
    }

    /// Creates the filter sharing `cache`.
    pub fn with_cache(provider: Arc<dyn CorpusProvider>, cache: Arc<ContentCache>) -> Self {
        Self { provider, cache }
    }

    /// The content cache in use.
    #[must_use]
    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }
}

#[async_trait]
impl ItemFilter for MissingImageFilter {
    fn name(&self) -> &str {
        "missing_image"
    }

    async fn keep(&self, item: &Item) -> GapResult<bool> {
        let text = self
            .cache
            .get_or_fetch(self.provider.as_ref(), &item.title)
            .await?;
        Ok(!has_image(&text))
    }
}

impl std::fmt::Debug for MissingImageFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissingImageFilter")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockCorpusProvider;
    use crate::errors::GapError;
    use mockall::predicate::eq;

    #[test]
    fn test_has_image_patterns() {
        assert!(has_image("[[File:Tour.jpg|thumb]]"));
        assert!(has_image("<gallery>\nA.png\n</gallery>"));
        assert!(has_image("[[Image:Plan]]"));
        assert!(has_image("logo.SVG"));
        assert!(!has_image("Paris est la capitale de la France."));
        assert!(!has_image(""));
    }

    #[test]
    fn test_has_image_is_case_sensitive() {
        assert!(!has_image("[[file:tour]]"));
        assert!(!has_image("photo.Jpg"));
    }

    #[tokio::test]
    async fn test_filter_keeps_pages_without_image() {
        let mut provider = MockCorpusProvider::new();
        provider
            .expect_fetch_content()
            .with(eq("Lyon"))
            .times(1)
            .returning(|_| Ok("Lyon est une ville.".to_string()));
        provider
            .expect_fetch_content()
            .with(eq("Nice"))
            .times(1)
            .returning(|_| Ok("[[Fichier:Nice.jpg]]".to_string()));

        let filter = MissingImageFilter::new(Arc::new(provider));
        assert!(filter.keep(&Item::article("Lyon")).await.unwrap());
        assert!(!filter.keep(&Item::article("Nice")).await.unwrap());
    }

    #[tokio::test]
    async fn test_content_is_fetched_once() {
        let mut provider = MockCorpusProvider::new();
        provider
            .expect_fetch_content()
            .times(1)
            .returning(|_| Ok(String::new()));

        let filter = MissingImageFilter::new(Arc::new(provider));
        let item = Item::article("Lyon");
        assert!(filter.keep(&item).await.unwrap());
        assert!(filter.keep(&item).await.unwrap());
        assert_eq!(filter.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let mut provider = MockCorpusProvider::new();
        provider
            .expect_fetch_content()
            .returning(|_| Err(GapError::upstream("fetch_content", "timeout")));

        let filter = MissingImageFilter::new(Arc::new(provider));
        let err = filter.keep(&Item::article("Lyon")).await.unwrap_err();
        assert!(err.is_upstream());
        assert!(filter.cache().is_empty());
    }
}
