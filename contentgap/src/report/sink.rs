//! Report destinations.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::format::render;
use crate::client::PageWriter;
use crate::core::RunSnapshot;
use crate::errors::GapResult;
use crate::pipeline::CheckpointAction;

/// Edit summary of report saves.
pub const REPORT_SUMMARY: &str = "Content gap report";

/// Persists report text at a named location. Each save replaces the
/// previous content.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Overwrites `location` with `text`.
    async fn save(&self, location: &str, text: &str) -> GapResult<()>;
}

/// Saves reports as wiki pages.
#[derive(Clone)]
pub struct WikiReportSink {
    writer: Arc<dyn PageWriter>,
}

impl WikiReportSink {
    /// Creates a sink writing through `writer`.
    pub fn new(writer: Arc<dyn PageWriter>) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl ReportSink for WikiReportSink {
    async fn save(&self, location: &str, text: &str) -> GapResult<()> {
        tracing::info!(page = location, bytes = text.len(), "Saving report");
        self.writer.write(location, text, REPORT_SUMMARY).await
    }
}

impl std::fmt::Debug for WikiReportSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiReportSink").finish_non_exhaustive()
    }
}

/// Saves reports as `<dir>/<location>.wiki` files.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    /// Creates a sink rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `location`. Path separators and the namespace colon
    /// become underscores.
    #[must_use]
    pub fn path_for(&self, location: &str) -> PathBuf {
        let name: String = location
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c => c,
            })
            .collect();
        self.dir.join(format!("{name}.wiki"))
    }

    /// Directory holding the reports.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn save(&self, location: &str, text: &str) -> GapResult<()> {
        let path = self.path_for(location);
        tracing::info!(path = %path.display(), bytes = text.len(), "Saving report");
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, text).await?;
        Ok(())
    }
}

/// Checkpoint action rendering each snapshot into a report and saving it.
#[derive(Clone)]
pub struct ReportCheckpoint {
    sink: Arc<dyn ReportSink>,
    location: String,
}

impl ReportCheckpoint {
    /// Creates the action saving to `location` through `sink`.
    pub fn new(sink: Arc<dyn ReportSink>, location: impl Into<String>) -> Self {
        Self {
            sink,
            location: location.into(),
        }
    }

    /// Where reports go.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

#[async_trait]
impl CheckpointAction for ReportCheckpoint {
    async fn on_checkpoint(&self, snapshot: &RunSnapshot) -> GapResult<()> {
        let text = render(
            &snapshot.ranked,
            Some(snapshot.total_seen),
            Some(snapshot.total_filtered),
        );
        self.sink.save(&self.location, &text).await
    }
}

impl std::fmt::Debug for ReportCheckpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportCheckpoint")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
