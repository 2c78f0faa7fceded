//! Schema comparator implementation
//!
//! The comparison is source-driven: every source table and column is looked up
//! on the target, and anything that exists only on the target is ignored.

use super::diff::{
    ColumnChange, ColumnChangeKind, ColumnComparison, IndexMismatch, SchemaDiff, TableDiff,
    TableStatus,
};
use super::statistics::SchemaStatistics;
use crate::snapshot::{Column, Snapshot, Table};

/// Configuration for schema comparison
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareConfig {
    /// Whether index memberships take part in column equality
    pub check_indexes: bool,
}

impl CompareConfig {
    /// Creates a new config with index checking disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables index comparison
    pub fn with_indexes(mut self) -> Self {
        self.check_indexes = true;
        self
    }
}

/// A source table paired with its same-schema, same-name target table
#[derive(Debug, Clone, Copy)]
pub struct TableMatch<'a> {
    pub source: &'a Table,
    pub target: Option<&'a Table>,
}

/// Pairs every source table with its target counterpart, ordered by schema
/// then name
pub fn match_tables<'a>(source: &'a Snapshot, target: &'a Snapshot) -> Vec<TableMatch<'a>> {
    source
        .tables()
        .map(|table| TableMatch {
            source: table,
            target: target.find_table(table.name(), table.schema()),
        })
        .collect()
}

/// Schema comparator for comparing two snapshots
#[derive(Debug, Default)]
pub struct SchemaComparator {
    config: CompareConfig,
}

impl SchemaComparator {
    /// Creates a new schema comparator with default configuration
    pub fn new() -> Self {
        Self {
            config: CompareConfig::default(),
        }
    }

    /// Creates a new schema comparator with the given configuration
    pub fn with_config(config: CompareConfig) -> Self {
        Self { config }
    }

    /// Returns the comparator's configuration
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compares two snapshots. Neither snapshot is modified.
    pub fn compare(&self, source: &Snapshot, target: &Snapshot) -> SchemaDiff {
        let matches = match_tables(source, target);
        let tables: Vec<TableDiff> = matches
            .iter()
            .map(|m| self.compare_table(m.source, m.target))
            .collect();
        let statistics = SchemaStatistics::from_matches(source, target, &matches);

        let diff = SchemaDiff {
            check_indexes: self.config.check_indexes,
            tables,
            statistics,
        };
        tracing::info!(
            tables = diff.tables.len(),
            changed = diff.changed_tables().count(),
            missing = diff.missing_tables().count(),
            check_indexes = self.config.check_indexes,
            "schema comparison finished"
        );
        diff
    }

    /// Compares one source table against its target counterpart, if any
    pub fn compare_table(&self, source: &Table, target: Option<&Table>) -> TableDiff {
        let Some(target) = target else {
            tracing::debug!(table = %source.qualified_name(), "table missing on target");
            return TableDiff {
                schema: source.schema().to_string(),
                name: source.name().to_string(),
                table_type: source.table_type().clone(),
                status: TableStatus::MissingOnTarget,
                changes: Vec::new(),
                index_mismatches: Vec::new(),
                columns: source
                    .columns()
                    .map(|column| self.compare_column(column, None))
                    .collect(),
            };
        };

        let mut changes = Vec::new();
        let mut index_mismatches = Vec::new();
        let mut columns = Vec::with_capacity(source.column_count());

        for column in source.columns() {
            let target_column = target.find_column(column.name());
            for kind in column_changes(column, target_column) {
                tracing::debug!(
                    table = %source.qualified_name(),
                    column = column.name(),
                    change = ?kind,
                    "column difference"
                );
                changes.push(ColumnChange {
                    column: column.name().to_string(),
                    kind,
                });
            }

            let comparison = self.compare_column(column, target_column);
            if target_column.is_some() && !comparison.missing_indexes.is_empty() {
                index_mismatches.push(IndexMismatch {
                    column: column.name().to_string(),
                    missing: comparison.missing_indexes.clone(),
                });
            }
            columns.push(comparison);
        }

        let status = if changes.is_empty() && index_mismatches.is_empty() {
            TableStatus::Unchanged
        } else {
            TableStatus::Changed
        };

        TableDiff {
            schema: source.schema().to_string(),
            name: source.name().to_string(),
            table_type: source.table_type().clone(),
            status,
            changes,
            index_mismatches,
            columns,
        }
    }

    /// Pairs a source column with its target counterpart
    pub fn compare_column(&self, source: &Column, target: Option<&Column>) -> ColumnComparison {
        let missing_indexes = if self.config.check_indexes {
            source.missing_indexes_in(target)
        } else {
            Vec::new()
        };
        ColumnComparison {
            source: source.clone(),
            target: target.cloned(),
            equal: self.are_columns_equal(source, target),
            missing_indexes,
        }
    }

    /// Name, data type and max length must match; with index checking on,
    /// the source's index memberships must also all exist on the target.
    pub fn are_columns_equal(&self, source: &Column, target: Option<&Column>) -> bool {
        let Some(target) = target else {
            return false;
        };
        source == target && (!self.config.check_indexes || source.is_index_same(target))
    }
}

/// Change records for one column. A missing target column yields only
/// `ColumnMissing`.
fn column_changes(source: &Column, target: Option<&Column>) -> Vec<ColumnChangeKind> {
    let Some(target) = target else {
        return vec![ColumnChangeKind::ColumnMissing];
    };
    let mut kinds = Vec::new();
    if source.data_type() != target.data_type() {
        kinds.push(ColumnChangeKind::DataTypeChanged {
            source: source.data_type().to_string(),
            target: target.data_type().to_string(),
        });
    }
    if source.max_length() != target.max_length() {
        kinds.push(ColumnChangeKind::MaxLengthChanged {
            source: source.max_length(),
            target: target.max_length(),
        });
    }
    kinds
}
