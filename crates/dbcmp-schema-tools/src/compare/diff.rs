//! Diff result data structures
//!
//! A [`SchemaDiff`] is produced once per comparison run and never mutated
//! afterwards. Reporting sinks read it through the flat row views
//! ([`SchemaDiff::report_rows`], [`SchemaDiff::statistics_rows`],
//! [`SchemaDiff::index_rows`]) which already carry every optional field
//! defaulted, so no sink needs its own null handling.

use serde::{Serialize, Serializer};

use super::statistics::SchemaStatistics;
use crate::snapshot::{Column, Index, IndexHighlight, TableType};

/// Placeholder written for a source index that has no counterpart on the target
pub const MISSING_INDEX_MARKER: &str = "MISSING/INVALID IN TARGET";

/// Result of comparing a source snapshot against a target snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDiff {
    /// Whether index memberships took part in the comparison
    pub check_indexes: bool,
    /// One entry per source table, ordered by schema then name
    pub tables: Vec<TableDiff>,
    pub statistics: SchemaStatistics,
}

impl SchemaDiff {
    /// Returns true if no source table had any difference
    pub fn is_empty(&self) -> bool {
        self.tables
            .iter()
            .all(|t| t.status == TableStatus::Unchanged)
    }

    /// Total number of findings: missing tables, column changes and columns
    /// with missing index memberships
    pub fn change_count(&self) -> usize {
        self.tables
            .iter()
            .map(|t| {
                let missing = usize::from(t.status == TableStatus::MissingOnTarget);
                missing + t.changes.len() + t.index_mismatches.len()
            })
            .sum()
    }

    pub fn missing_tables(&self) -> impl Iterator<Item = &TableDiff> {
        self.tables
            .iter()
            .filter(|t| t.status == TableStatus::MissingOnTarget)
    }

    pub fn changed_tables(&self) -> impl Iterator<Item = &TableDiff> {
        self.tables
            .iter()
            .filter(|t| t.status != TableStatus::Unchanged)
    }

    /// Human-readable analysis, one line per entry
    pub fn change_log(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for table in &self.tables {
            let qualified = table.qualified_name();
            lines.push(format!(
                "Analyzing {} {}...",
                table.table_type.display(),
                qualified
            ));
            match table.status {
                TableStatus::MissingOnTarget => {
                    lines.push(format!(" - {} is missing on Target Database", qualified));
                }
                TableStatus::Unchanged => {
                    lines.push("No difference spotted on source and target".to_string());
                }
                TableStatus::Changed => {
                    for change in &table.changes {
                        lines.push(format!("  -  - {}", change.describe(&qualified)));
                    }
                    for mismatch in &table.index_mismatches {
                        lines.push(format!("  -  - {}", mismatch.describe(&qualified)));
                    }
                }
            }
        }
        lines
    }

    /// One row per source column, tables ordered by schema then name
    pub fn report_rows(&self) -> Vec<ReportRow> {
        let mut rows = Vec::new();
        for table in &self.tables {
            let target_present = table.status != TableStatus::MissingOnTarget;
            for comparison in &table.columns {
                let source = &comparison.source;
                let target = comparison.target.as_ref();
                rows.push(ReportRow {
                    source_schema: table.schema.clone(),
                    target_schema: text_if(target_present, &table.schema),
                    source_table_name: table.name.clone(),
                    target_table_name: text_if(target_present, &table.name),
                    source_column_name: source.name().to_string(),
                    target_column_name: target.map(|c| c.name().to_string()).unwrap_or_default(),
                    source_data_type: source.data_type().to_uppercase(),
                    target_data_type: target
                        .map(|c| c.data_type().to_uppercase())
                        .unwrap_or_default(),
                    source_length: length_text(source.max_length()),
                    target_length: length_text(target.and_then(Column::max_length)),
                    source_index: if self.check_indexes {
                        source.formatted_indexes()
                    } else {
                        String::new()
                    },
                    target_index: match target {
                        Some(c) if self.check_indexes => c.formatted_indexes(),
                        _ => String::new(),
                    },
                    change: !comparison.equal,
                });
            }
        }
        rows
    }

    /// Per-table column-count rows
    pub fn statistics_rows(&self) -> Vec<StatisticsRow> {
        self.statistics
            .tables
            .iter()
            .map(|t| StatisticsRow {
                source_schema: t.source_schema.clone(),
                target_schema: t.target_schema.clone().unwrap_or_default(),
                source_table_name: t.source_table.clone(),
                target_table_name: t.target_table.clone().unwrap_or_default(),
                source_column_count: t.source_column_count.to_string(),
                target_column_count: t
                    .target_column_count
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                change: t.column_count_changed,
            })
            .collect()
    }

    /// One row per source index membership of every column whose table exists
    /// on the target. Empty unless indexes were checked.
    pub fn index_rows(&self) -> Vec<IndexReportRow> {
        if !self.check_indexes {
            return Vec::new();
        }
        let mut rows = Vec::new();
        for table in &self.tables {
            if table.status == TableStatus::MissingOnTarget {
                continue;
            }
            for comparison in &table.columns {
                let target = comparison.target.as_ref();
                for index in comparison.source.indexes() {
                    let missing = comparison.missing_indexes.contains(index);
                    rows.push(IndexReportRow {
                        schema: table.schema.clone(),
                        table_name: table.name.clone(),
                        source_column_name: comparison.source.name().to_string(),
                        target_column_name: target
                            .map(|c| c.name().to_string())
                            .unwrap_or_default(),
                        source_index: index.name().to_string(),
                        target_index: if missing {
                            MISSING_INDEX_MARKER.to_string()
                        } else {
                            index.name().to_string()
                        },
                        index_type: index.index_type().to_string(),
                        ordinal: index.ordinal(),
                        include: index.is_include(),
                        highlight: index.index_type().highlight(),
                        change: missing,
                    });
                }
            }
        }
        rows
    }
}

fn text_if(present: bool, value: &str) -> String {
    if present {
        value.to_string()
    } else {
        String::new()
    }
}

fn length_text(max_length: Option<i64>) -> String {
    max_length.map(|l| l.to_string()).unwrap_or_default()
}

fn yes_no<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "Yes" } else { "No" })
}

/// Outcome for one source table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableStatus {
    Unchanged,
    Changed,
    MissingOnTarget,
}

/// Diff for one source table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDiff {
    pub schema: String,
    pub name: String,
    pub table_type: TableType,
    pub status: TableStatus,
    /// Column-level change records. Always empty for a missing table.
    pub changes: Vec<ColumnChange>,
    /// Columns whose source index memberships are not all present on the
    /// target column. Only filled when indexes are checked.
    pub index_mismatches: Vec<IndexMismatch>,
    /// Every source column with its target counterpart, in source order
    pub columns: Vec<ColumnComparison>,
}

impl TableDiff {
    pub fn qualified_name(&self) -> String {
        format!("[{}].[{}]", self.schema, self.name)
    }

    pub fn is_missing(&self) -> bool {
        self.status == TableStatus::MissingOnTarget
    }

    pub fn has_changes(&self) -> bool {
        self.status != TableStatus::Unchanged
    }
}

/// A single column-level change record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChange {
    pub column: String,
    #[serde(flatten)]
    pub kind: ColumnChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ColumnChangeKind {
    ColumnMissing,
    DataTypeChanged { source: String, target: String },
    MaxLengthChanged { source: Option<i64>, target: Option<i64> },
}

impl ColumnChange {
    /// Log line for this change on table `qualified_table`
    pub fn describe(&self, qualified_table: &str) -> String {
        match &self.kind {
            ColumnChangeKind::ColumnMissing => format!(
                "A column is missing on Target table {}. The missing column is {}",
                qualified_table, self.column
            ),
            ColumnChangeKind::DataTypeChanged { source, target } => format!(
                "The data type has been changed for column {} on table {} from {} [Source] to {} [Target]",
                self.column, qualified_table, source, target
            ),
            ColumnChangeKind::MaxLengthChanged { source, target } => format!(
                "The max length has been changed for column {} on table {} from {} [Source] to {} [Target]",
                self.column,
                qualified_table,
                length_or_null(*source),
                length_or_null(*target)
            ),
        }
    }
}

fn length_or_null(max_length: Option<i64>) -> String {
    max_length
        .map(|l| l.to_string())
        .unwrap_or_else(|| "NULL".to_string())
}

/// Source index memberships with no match on the target column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexMismatch {
    pub column: String,
    pub missing: Vec<Index>,
}

impl IndexMismatch {
    pub fn describe(&self, qualified_table: &str) -> String {
        let missing = self
            .missing
            .iter()
            .map(Index::formatted)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "The indexes differ for column {} on table {}. Missing on Target: {}",
            self.column, qualified_table, missing
        )
    }
}

/// A source column paired with its target counterpart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnComparison {
    pub source: Column,
    pub target: Option<Column>,
    /// Name, type and length match, and, when indexes are checked, the source
    /// index memberships are a subset of the target's
    pub equal: bool,
    /// Source index memberships absent on the target. Empty unless indexes
    /// are checked.
    pub missing_indexes: Vec<Index>,
}

/// Flat row of the per-column report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRow {
    pub source_schema: String,
    pub target_schema: String,
    pub source_table_name: String,
    pub target_table_name: String,
    pub source_column_name: String,
    pub target_column_name: String,
    pub source_data_type: String,
    pub target_data_type: String,
    pub source_length: String,
    pub target_length: String,
    pub source_index: String,
    pub target_index: String,
    #[serde(serialize_with = "yes_no")]
    pub change: bool,
}

/// Flat row of the per-table statistics report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatisticsRow {
    pub source_schema: String,
    pub target_schema: String,
    pub source_table_name: String,
    pub target_table_name: String,
    pub source_column_count: String,
    pub target_column_count: String,
    #[serde(serialize_with = "yes_no")]
    pub change: bool,
}

/// Flat row of the index report, one per source index membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexReportRow {
    pub schema: String,
    pub table_name: String,
    pub source_column_name: String,
    pub target_column_name: String,
    pub source_index: String,
    pub target_index: String,
    pub index_type: String,
    pub ordinal: u32,
    #[serde(serialize_with = "yes_no")]
    pub include: bool,
    pub highlight: IndexHighlight,
    #[serde(serialize_with = "yes_no")]
    pub change: bool,
}
