//! dbcmp - compare the schema of a target SQL Server database against a source
//!
//! Exit status: 0 when the comparison ran, 1 when differences were found and
//! `--fail-on-diff` is set, 2 on any fatal error.

mod logging;
mod render;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use dbcmp_core::{DatabaseDriver, DbcmpError};
use dbcmp_driver_mssql::MssqlDriver;
use dbcmp_schema_tools::{CompareSession, CsvReport, JsonReport, ReportSink, SchemaDiff};

use crate::logging::LoggingConfig;
use crate::settings::{ComparisonSettings, ReportFormat, SettingsOverrides};

#[derive(Parser, Debug)]
#[command(name = "dbcmp", version, about = "Compare a target database schema against a source")]
struct Cli {
    /// Source connection string (Server=...;Database=...;User Id=...;Password=...)
    #[arg(long, env = "DBCMP_SOURCE", hide_env_values = true)]
    source: String,

    /// Target connection string
    #[arg(long, env = "DBCMP_TARGET", hide_env_values = true)]
    target: String,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also compare index memberships
    #[arg(long)]
    check_indexes: bool,

    /// Do not write a report
    #[arg(long)]
    no_report: bool,

    /// Directory the report is written under
    #[arg(long)]
    report_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    report_format: Option<ReportFormat>,

    /// Fetch source and target at the same time
    #[arg(long)]
    concurrent: bool,

    /// Write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Exit with status 1 when differences are found
    #[arg(long)]
    fail_on_diff: bool,

    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            check_indexes: self.check_indexes,
            no_report: self.no_report,
            report_dir: self.report_dir.clone(),
            report_format: self.report_format,
            concurrent: self.concurrent,
            log_dir: self.log_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match ComparisonSettings::load(cli.config.as_deref()) {
        Ok(settings) => settings.apply(cli.overrides()),
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let logging = if cli.verbose {
        LoggingConfig::verbose()
    } else if cli.quiet {
        LoggingConfig::quiet()
    } else {
        LoggingConfig::default()
    };
    let _guard = match logging::init(logging.with_log_dir(settings.log_dir.clone())) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: failed to initialize logging: {:#}", e);
            return ExitCode::from(2);
        }
    };

    match run(&cli, &settings).await {
        Ok(diff) if cli.fail_on_diff && !diff.is_empty() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "comparison failed");
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli, settings: &ComparisonSettings) -> anyhow::Result<SchemaDiff> {
    ensure_distinct(&cli.source, &cli.target)?;

    let driver = MssqlDriver::new();
    let source = driver
        .parse_connection_string(&cli.source)
        .context("invalid source connection string")?;
    let target = driver
        .parse_connection_string(&cli.target)
        .context("invalid target connection string")?;

    let outcome = CompareSession::new()
        .with_indexes(settings.check_indexes)
        .with_fetch_mode(settings.fetch_mode)
        .run(&driver, &source, &target)
        .await?;

    for (side, snapshot) in [("source", &outcome.source), ("target", &outcome.target)] {
        let skipped = snapshot.skipped_rows().len();
        if skipped > 0 {
            eprintln!("warning: skipped {} malformed catalog rows on {}", skipped, side);
        }
    }

    print!("{}", render::render(&outcome.diff));

    if settings.create_report {
        let sink: Box<dyn ReportSink> = match settings.report_format {
            ReportFormat::Csv => Box::new(CsvReport::new(settings.report_dir.clone())),
            ReportFormat::Json => Box::new(JsonReport::new(settings.report_dir.clone())),
        };
        let written = sink.write(&outcome.diff).context("failed to write report")?;
        for path in written {
            println!("Report written to {}", path.display());
        }
    }

    Ok(outcome.diff)
}

/// Comparing a database against itself is always a mistake
fn ensure_distinct(source: &str, target: &str) -> dbcmp_core::Result<()> {
    if source.trim() == target.trim() {
        return Err(DbcmpError::Configuration(
            "source and target connection strings are identical".to_string(),
        ));
    }
    Ok(())
}
