//! Report rendering and persistence.

mod format;
mod sink;

pub use format::render;
pub use sink::{FileReportSink, ReportCheckpoint, ReportSink, WikiReportSink, REPORT_SUMMARY};
