//! Error types for the content gap pipeline.
//!
//! Every failure is surfaced to the caller that triggered it. The pipeline
//! never retries and never skips an item after an upstream failure.

use thiserror::Error;

/// The main error type for content gap operations.
#[derive(Debug, Error)]
pub enum GapError {
    /// A configuration value is outside its allowed set.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A remote call to a collaborator failed.
    #[error("Upstream fetch failed during {operation}: {message}")]
    UpstreamFetch {
        /// The operation that failed (e.g. "fetch_children").
        operation: String,
        /// The underlying failure description.
        message: String,
    },

    /// A collaborator answered without a field the caller relies on.
    #[error("Upstream response is missing '{field}'")]
    MissingData {
        /// The missing field.
        field: String,
    },

    /// The checkpoint action raised; the run was aborted.
    #[error("Checkpoint action failed: {source}")]
    CheckpointAction {
        /// The error returned by the action.
        #[source]
        source: Box<GapError>,
    },

    /// Ranking was requested before the items were filtered.
    #[error("Items must be filtered before they can be ranked")]
    FilterNotYetRun,

    /// Configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GapError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Creates an upstream fetch error.
    #[must_use]
    pub fn upstream(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::UpstreamFetch {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Creates a missing data error.
    #[must_use]
    pub fn missing_data(field: impl Into<String>) -> Self {
        Self::MissingData {
            field: field.into(),
        }
    }

    /// Wraps an error raised by a checkpoint action.
    #[must_use]
    pub fn checkpoint(source: Self) -> Self {
        Self::CheckpointAction {
            source: Box::new(source),
        }
    }

    /// Returns a stable identifier for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "InvalidConfiguration",
            Self::UpstreamFetch { .. } | Self::MissingData { .. } => "UpstreamFetchFailure",
            Self::CheckpointAction { .. } => "CheckpointActionFailure",
            Self::FilterNotYetRun => "FilterNotYetRun",
            Self::Config(_) => "Config",
            Self::Serialization(_) => "Serialization",
            Self::Io(_) => "Io",
        }
    }

    /// Whether the error originates from a remote collaborator.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamFetch { .. } | Self::MissingData { .. })
    }
}

/// Convenience result alias.
pub type GapResult<T> = Result<T, GapError>;
