//! Comparison settings
//!
//! Values come from an optional TOML file and are then overridden by command
//! line flags. When no file is named, `<config dir>/dbcmp/settings.toml` is
//! read if it exists.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::ValueEnum;
use dbcmp_schema_tools::FetchMode;
use serde::Deserialize;

/// Output format of the written report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    /// Compare index memberships as well as columns
    pub check_indexes: bool,
    /// Write a report after the comparison
    pub create_report: bool,
    /// Directory the report is written under
    pub report_dir: PathBuf,
    pub report_format: ReportFormat,
    pub fetch_mode: FetchMode,
    /// Enables the JSON log file when set
    pub log_dir: Option<PathBuf>,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            check_indexes: false,
            create_report: true,
            report_dir: PathBuf::from("."),
            report_format: ReportFormat::Csv,
            fetch_mode: FetchMode::Sequential,
            log_dir: None,
        }
    }
}

/// Command line values that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub check_indexes: bool,
    pub no_report: bool,
    pub report_dir: Option<PathBuf>,
    pub report_format: Option<ReportFormat>,
    pub concurrent: bool,
    pub log_dir: Option<PathBuf>,
}

impl ComparisonSettings {
    /// Loads settings from `path`, or from the default location when `path`
    /// is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_settings_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Flags only ever switch behavior on; an unset flag keeps the file value
    pub fn apply(mut self, overrides: SettingsOverrides) -> Self {
        if overrides.check_indexes {
            self.check_indexes = true;
        }
        if overrides.no_report {
            self.create_report = false;
        }
        if let Some(dir) = overrides.report_dir {
            self.report_dir = dir;
        }
        if let Some(format) = overrides.report_format {
            self.report_format = format;
        }
        if overrides.concurrent {
            self.fetch_mode = FetchMode::Concurrent;
        }
        if let Some(dir) = overrides.log_dir {
            self.log_dir = Some(dir);
        }
        self
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dbcmp").join("settings.toml"))
}
