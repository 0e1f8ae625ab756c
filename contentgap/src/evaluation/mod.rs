//! Scoring of surviving items.

mod pageviews;

pub use pageviews::PageViewEvaluator;

use async_trait::async_trait;
use std::fmt;

use crate::core::Item;
use crate::errors::GapResult;

/// Maps an item to its rank value. Higher ranks first.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Scores one item.
    async fn evaluate(&self, item: &Item) -> GapResult<i64>;
}

/// Gives every item the same score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantEvaluator(pub i64);

#[async_trait]
impl Evaluator for ConstantEvaluator {
    async fn evaluate(&self, _item: &Item) -> GapResult<i64> {
        Ok(self.0)
    }
}

/// An evaluator backed by a synchronous closure.
pub struct FnEvaluator<F>(F);

impl<F> FnEvaluator<F>
where
    F: Fn(&Item) -> i64 + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(score: F) -> Self {
        Self(score)
    }
}

#[async_trait]
impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&Item) -> i64 + Send + Sync,
{
    async fn evaluate(&self, item: &Item) -> GapResult<i64> {
        Ok((self.0)(item))
    }
}

impl<F> fmt::Debug for FnEvaluator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEvaluator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_constant_and_closure() {
        let item = Item::article("Paris");
        assert_eq!(ConstantEvaluator(0).evaluate(&item).await.unwrap(), 0);
        let by_length = FnEvaluator::new(|i: &Item| i.title.len() as i64);
        assert_eq!(by_length.evaluate(&item).await.unwrap(), 5);
    }
}
