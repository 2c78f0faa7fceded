use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::{ReportError, ReportSink, report_stem};
use crate::compare::SchemaDiff;

/// Writes `report.csv`, `statistics.csv` and, when indexes were checked,
/// `index.csv` into a fresh timestamped directory under `base_dir`
#[derive(Debug, Clone)]
pub struct CsvReport {
    base_dir: PathBuf,
    timestamp: DateTime<Local>,
}

impl CsvReport {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            timestamp: Local::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Directory the files land in
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(report_stem(self.timestamp))
    }
}

impl ReportSink for CsvReport {
    fn write(&self, diff: &SchemaDiff) -> Result<Vec<PathBuf>, ReportError> {
        let dir = self.output_dir();
        std::fs::create_dir_all(&dir)?;

        let mut written = vec![
            write_rows(&dir.join("report.csv"), &diff.report_rows())?,
            write_rows(&dir.join("statistics.csv"), &diff.statistics_rows())?,
        ];
        if diff.check_indexes {
            written.push(write_rows(&dir.join("index.csv"), &diff.index_rows())?);
        }

        tracing::info!(dir = %dir.display(), files = written.len(), "csv report written");
        Ok(written)
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf, ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}
