//! Item filters.
//!
//! A run applies its filters in order and keeps an item only if every
//! filter keeps it; evaluation stops at the first rejection.

mod image;

pub use image::{has_image, ContentCache, MissingImageFilter, IMAGE_PATTERNS};

use async_trait::async_trait;
use std::fmt;

use crate::core::Item;
use crate::errors::GapResult;

/// A predicate deciding whether an item stays in the run.
#[async_trait]
pub trait ItemFilter: Send + Sync {
    /// Name reported when the filter rejects an item.
    fn name(&self) -> &str;

    /// Returns `true` to keep the item.
    async fn keep(&self, item: &Item) -> GapResult<bool>;
}

/// A filter backed by a synchronous closure.
pub struct FnFilter<F> {
    name: String,
    predicate: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&Item) -> bool + Send + Sync,
{
    /// Creates a named filter.
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

#[async_trait]
impl<F> ItemFilter for FnFilter<F>
where
    F: Fn(&Item) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn keep(&self, item: &Item) -> GapResult<bool> {
        Ok((self.predicate)(item))
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_filter() {
        let filter = FnFilter::new("short", |item: &Item| item.title.len() < 5);
        assert_eq!(filter.name(), "short");
        assert!(filter.keep(&Item::article("Nice")).await.unwrap());
        assert!(!filter.keep(&Item::article("Marseille")).await.unwrap());
    }
}
