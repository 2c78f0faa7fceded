//! Reporting sinks
//!
//! A sink consumes a finished [`SchemaDiff`] and persists it. Layout and file
//! format are entirely the sink's concern; the diff's row views carry the data.

mod csv_report;
mod json_report;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::compare::SchemaDiff;

pub use csv_report::*;
pub use json_report::*;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Something that can persist a diff
pub trait ReportSink {
    /// Writes the report and returns the paths of every file created
    fn write(&self, diff: &SchemaDiff) -> Result<Vec<PathBuf>, ReportError>;
}

/// `report_<yyyy-mm-dd HH_MM_SS>`
pub fn report_stem(at: DateTime<Local>) -> String {
    format!("report_{}", at.format("%Y-%m-%d %H_%M_%S"))
}
