use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local};

use super::{ReportError, ReportSink, report_stem};
use crate::compare::SchemaDiff;

/// Serializes the whole diff as pretty-printed JSON into
/// `<base_dir>/report_<timestamp>.json`
#[derive(Debug, Clone)]
pub struct JsonReport {
    base_dir: PathBuf,
    timestamp: DateTime<Local>,
}

impl JsonReport {
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

    pub fn output_path(&self) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", report_stem(self.timestamp)))
    }
}

impl ReportSink for JsonReport {
    fn write(&self, diff: &SchemaDiff) -> Result<Vec<PathBuf>, ReportError> {
        std::fs::create_dir_all(&self.base_dir)?;
        let path = self.output_path();
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, diff)?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "json report written");
        Ok(vec![path])
    }
}
