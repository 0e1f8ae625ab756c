//! Core domain model types.
//!
//! This module contains the fundamental types shared by every component:
//! - Items and their namespaces
//! - Ranked results and their ordering
//! - Immutable run snapshots

mod item;
mod snapshot;

pub use item::{
    sort_by_score_desc, Item, Namespace, RankedItem, ARTICLE_NAMESPACE_ID,
    CATEGORY_NAMESPACE_ID,
};
pub use snapshot::RunSnapshot;
