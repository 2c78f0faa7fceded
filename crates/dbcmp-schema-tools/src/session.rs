//! Scoped fetch-and-compare
//!
//! Each snapshot is captured over its own connection, which is closed before
//! `capture_snapshot` returns on every path. Nothing here is global; a
//! [`CompareSession`] owns its configuration and hands back the snapshots and
//! diff it produced.

use dbcmp_core::{ConnectionConfig, DatabaseDriver, DbcmpError, Result};
use serde::{Deserialize, Serialize};

use crate::compare::{CompareConfig, SchemaComparator, SchemaDiff};
use crate::snapshot::{LoadOptions, Snapshot, SnapshotLoader};

/// How the two snapshots are fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Source first, then target
    #[default]
    Sequential,
    /// Both at once on the current task
    Concurrent,
}

/// Connects, loads a snapshot and closes the connection.
///
/// The connection is closed whether or not the load succeeded. A close failure
/// is logged and does not mask the load result.
#[tracing::instrument(skip(driver, config), fields(db = %config.display_target()))]
pub async fn capture_snapshot(
    driver: &dyn DatabaseDriver,
    config: &ConnectionConfig,
    options: LoadOptions,
) -> Result<Snapshot> {
    let connection = driver.connect(config).await?;

    let result = match connection.as_catalog() {
        Some(catalog) => SnapshotLoader::new(catalog).with_options(options).load().await,
        None => Err(DbcmpError::NotSupported(format!(
            "driver '{}' does not expose a catalog",
            connection.driver_name()
        ))),
    };

    if let Err(e) = connection.close().await {
        tracing::warn!(error = %e, "failed to close connection");
    }

    if let Ok(snapshot) = &result {
        tracing::info!(
            tables = snapshot.table_count(),
            skipped = snapshot.skipped_rows().len(),
            "snapshot captured"
        );
    }
    result
}

/// Everything a finished session produced
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub source: Snapshot,
    pub target: Snapshot,
    pub diff: SchemaDiff,
}

/// One comparison run between a source and a target database
#[derive(Debug, Clone, Default)]
pub struct CompareSession {
    check_indexes: bool,
    fetch_mode: FetchMode,
}

impl CompareSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indexes(mut self, check_indexes: bool) -> Self {
        self.check_indexes = check_indexes;
        self
    }

    pub fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = fetch_mode;
        self
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Captures both snapshots and compares them. The comparison only starts
    /// once both snapshots are fully loaded.
    pub async fn run(
        &self,
        driver: &dyn DatabaseDriver,
        source: &ConnectionConfig,
        target: &ConnectionConfig,
    ) -> Result<SessionOutcome> {
        let options = LoadOptions {
            include_indexes: self.check_indexes,
        };

        let (source_snapshot, target_snapshot) = match self.fetch_mode {
            FetchMode::Sequential => {
                let s = capture_snapshot(driver, source, options).await?;
                let t = capture_snapshot(driver, target, options).await?;
                (s, t)
            }
            // Both captures run to completion so each closes its own connection.
            FetchMode::Concurrent => {
                let (s, t) = tokio::join!(
                    capture_snapshot(driver, source, options),
                    capture_snapshot(driver, target, options)
                );
                (s?, t?)
            }
        };

        let config = if self.check_indexes {
            CompareConfig::new().with_indexes()
        } else {
            CompareConfig::new()
        };
        let diff = SchemaComparator::with_config(config).compare(&source_snapshot, &target_snapshot);

        Ok(SessionOutcome {
            source: source_snapshot,
            target: target_snapshot,
            diff,
        })
    }
}
