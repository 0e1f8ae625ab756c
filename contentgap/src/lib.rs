//! # Contentgap
//!
//! Finds wiki articles lacking an image, ranks them by page views and keeps
//! a report of the result up to date while the scan runs.
//!
//! A run is built from:
//!
//! - **Corpus sources**: category trees, template transclusions, random
//!   articles or recent changes, all exposed as an item stream
//! - **Filters**: the missing-image predicate, applied in order
//! - **Evaluators**: page views over a 30, 60 or 90 day window
//! - **Checkpoints**: an action receiving a sorted snapshot of the ranking
//!   every few minutes and once when the scan ends
//! - **Reports**: a wiki table saved to a page or a local file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contentgap::prelude::*;
//!
//! let wiki = Arc::new(MediaWikiClient::new(ClientConfig::new("fr"))?);
//! let views = Arc::new(PageviewsClient::new(ClientConfig::new("fr"))?);
//!
//! let mut bot = GapBot::new(BotConfig::new("Projet:Illustration/Rapport"), wiki, views)?;
//! let snapshot = bot
//!     .run(&CorpusQuery::Category { name: "Peintre".into(), depth: 1 })
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod bot;
pub mod client;
pub mod core;
pub mod corpus;
pub mod errors;
pub mod evaluation;
pub mod filters;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bot::{BotConfig, GapBot};
    pub use crate::client::{
        ClientConfig, CorpusProvider, Credentials, FeedProvider, ListingPage, PageWriter,
        PopularityProvider, ViewWindow, WikiClient,
    };
    #[cfg(feature = "mediawiki")]
    pub use crate::client::{MediaWikiClient, PageviewsClient};
    pub use crate::core::{Item, Namespace, RankedItem, RunSnapshot};
    pub use crate::corpus::{open_source, CorpusQuery, ItemStream};
    pub use crate::errors::{GapError, GapResult};
    pub use crate::evaluation::{ConstantEvaluator, Evaluator, PageViewEvaluator};
    pub use crate::filters::{has_image, ItemFilter, MissingImageFilter};
    pub use crate::observability::{LoggingRunObserver, NoOpRunObserver, RunObserver};
    pub use crate::pipeline::{Checkpoint, CheckpointAction, ContentGap, PipelineEngine};
    pub use crate::report::{render, ReportCheckpoint, ReportSink, WikiReportSink};
    pub use crate::utils::Timestamp;
    pub use std::sync::Arc;
}
