//! Summary counts over a pair of snapshots

use serde::Serialize;

use super::comparator::{TableMatch, match_tables};
use crate::snapshot::Snapshot;

/// Aggregate counts for both sides plus a per-table column count comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaStatistics {
    pub source_table_count: usize,
    pub target_table_count: usize,
    pub source_schema_count: usize,
    pub target_schema_count: usize,
    /// One entry per source table, ordered by schema then name
    pub tables: Vec<TableStatistics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatistics {
    pub source_schema: String,
    pub source_table: String,
    pub target_schema: Option<String>,
    pub target_table: Option<String>,
    pub source_column_count: usize,
    pub target_column_count: Option<usize>,
    /// Counts differ, or the table is missing on the target
    pub column_count_changed: bool,
}

impl SchemaStatistics {
    /// Builds the summary from an existing table matching
    pub fn from_matches(source: &Snapshot, target: &Snapshot, matches: &[TableMatch<'_>]) -> Self {
        let tables = matches
            .iter()
            .map(|m| {
                let target_column_count = m.target.map(|t| t.column_count());
                TableStatistics {
                    source_schema: m.source.schema().to_string(),
                    source_table: m.source.name().to_string(),
                    target_schema: m.target.map(|t| t.schema().to_string()),
                    target_table: m.target.map(|t| t.name().to_string()),
                    source_column_count: m.source.column_count(),
                    target_column_count,
                    column_count_changed: target_column_count != Some(m.source.column_count()),
                }
            })
            .collect();

        Self {
            source_table_count: source.table_count(),
            target_table_count: target.table_count(),
            source_schema_count: source.schema_count(),
            target_schema_count: target.schema_count(),
            tables,
        }
    }
}

/// Computes the statistics summary on its own, without running a full diff
pub fn summarize(source: &Snapshot, target: &Snapshot) -> SchemaStatistics {
    SchemaStatistics::from_matches(source, target, &match_tables(source, target))
}
