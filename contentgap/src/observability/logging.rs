//! Tracing subscriber setup for the `image-gap` binary.

use crate::errors::GapResult;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "contentgap=info,image_gap=info";
const VERBOSE_LOG_FILTER: &str = "contentgap=debug,image_gap=debug";
const FILE_LOG_FILTER: &str = "contentgap=debug,image_gap=debug";

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Log per-item activity on the console.
    pub verbose: bool,
    /// Emit console output as JSON lines.
    pub json: bool,
    /// Append debug-level output to this file as well.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Console filter: `RUST_LOG` when set, otherwise info or debug.
    fn console_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if self.verbose {
                VERBOSE_LOG_FILTER
            } else {
                DEFAULT_LOG_FILTER
            })
        })
    }
}

/// Installs the global tracing subscriber.
///
/// Fails only when the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> GapResult<()> {
    let console = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(config.console_filter())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(config.console_filter())
            .boxed()
    };

    let file = match &config.file {
        Some(path) => {
            let handle = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(handle))
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(FILE_LOG_FILTER)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(())
}
