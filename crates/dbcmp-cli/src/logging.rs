//! Logging setup for the `dbcmp` binary
//!
//! Console output goes to stderr so stdout carries only the comparison
//! result. When a log directory is configured, a daily rolling JSON log is
//! written there as well. `RUST_LOG` takes precedence over the default filter.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CRATES: [&str; 4] = ["dbcmp", "dbcmp_core", "dbcmp_schema_tools", "dbcmp_driver_mssql"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// JSON log files are written here when set
    pub log_dir: Option<PathBuf>,

    pub enable_console_logs: bool,

    /// Whether to include file/line information in console logs
    pub include_location: bool,

    /// Log span open/close events
    pub enable_spans: bool,

    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            enable_console_logs: true,
            include_location: false,
            enable_spans: false,
            default_filter: filter_for("warn", "info"),
        }
    }
}

impl LoggingConfig {
    /// Verbose output: debug for our crates, span events and source locations
    pub fn verbose() -> Self {
        Self {
            include_location: true,
            enable_spans: true,
            default_filter: filter_for("info", "debug"),
            ..Self::default()
        }
    }

    /// Errors only on the console
    pub fn quiet() -> Self {
        Self {
            default_filter: "error".to_string(),
            ..Self::default()
        }
    }

    pub fn with_log_dir(mut self, log_dir: Option<PathBuf>) -> Self {
        self.log_dir = log_dir;
        self
    }
}

fn filter_for(global: &str, ours: &str) -> String {
    let mut filter = global.to_string();
    for name in CRATES {
        filter.push_str(&format!(",{}={}", name, ours));
    }
    filter
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped and must be held
/// until the program exits.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // NEW fires once per span; ENTER would fire on every re-poll of an awaited future.
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();
    let mut guard = None;

    if config.enable_console_logs {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_location)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .compact()
            .with_filter(env_filter.clone())
            .boxed();

        layers.push(console_layer);
    }

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;
        let file_appender = tracing_appender::rolling::daily(log_dir, "dbcmp.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();

        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_dir = ?config.log_dir,
        console_enabled = config.enable_console_logs,
        "logging initialized"
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert!(config.enable_console_logs);
        assert!(config.log_dir.is_none());
        assert!(config.default_filter.starts_with("warn,"));
        assert!(config.default_filter.contains("dbcmp_schema_tools=info"));
    }

    #[test]
    fn test_verbose_config() {
        let config = LoggingConfig::verbose();
        assert!(config.enable_spans);
        assert!(config.default_filter.contains("dbcmp_driver_mssql=debug"));
    }

    #[test]
    fn test_quiet_config() {
        assert_eq!(LoggingConfig::quiet().default_filter, "error");
    }

    #[test]
    fn test_log_dir() {
        let config = LoggingConfig::default().with_log_dir(Some(PathBuf::from("logs")));
        assert_eq!(config.log_dir, Some(PathBuf::from("logs")));
    }
}
