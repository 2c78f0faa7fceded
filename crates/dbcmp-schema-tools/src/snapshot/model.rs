//! Snapshot data structures
//!
//! Ownership is strictly hierarchical: a [`Snapshot`] owns its tables, a
//! [`Table`] owns its columns and a [`Column`] owns its index memberships.
//! Lookups go through explicit keys (`(schema, name)` for tables, `name` for
//! columns) rather than structural hashing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Index type tag as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndexType {
    Clustered,
    NonClustered,
    /// Any other engine-specific tag, kept verbatim
    Other(String),
}

impl IndexType {
    /// Classifies a raw tag. Matching is exact; `clustered` is not `CLUSTERED`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "CLUSTERED" => IndexType::Clustered,
            "NONCLUSTERED" => IndexType::NonClustered,
            other => IndexType::Other(other.to_string()),
        }
    }

    /// The raw tag
    pub fn as_str(&self) -> &str {
        match self {
            IndexType::Clustered => "CLUSTERED",
            IndexType::NonClustered => "NONCLUSTERED",
            IndexType::Other(tag) => tag,
        }
    }

    /// Presentation class used by report sinks for highlighting
    pub fn highlight(&self) -> IndexHighlight {
        match self {
            IndexType::Clustered => IndexHighlight::Clustered,
            IndexType::NonClustered => IndexHighlight::NonClustered,
            IndexType::Other(_) => IndexHighlight::Neutral,
        }
    }
}

impl From<String> for IndexType {
    fn from(tag: String) -> Self {
        IndexType::from_tag(&tag)
    }
}

impl From<IndexType> for String {
    fn from(index_type: IndexType) -> Self {
        index_type.as_str().to_string()
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an index type is highlighted in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexHighlight {
    Clustered,
    NonClustered,
    Neutral,
}

/// One (index, key position) membership of a column.
///
/// Two memberships are the same iff name, ordinal and type all match, which is
/// exactly the derived `PartialEq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    name: String,
    index_type: IndexType,
    ordinal: u32,
}

impl Index {
    pub fn new(name: impl Into<String>, index_type: IndexType, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            index_type,
            ordinal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index_type(&self) -> &IndexType {
        &self.index_type
    }

    /// Position in the index key, 1-based
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Ordinal 0 means the column is an INCLUDE column, not a key column
    pub fn is_include(&self) -> bool {
        self.ordinal == 0
    }

    /// `"<name> - <TYPE>"`
    pub fn formatted(&self) -> String {
        format!("{} - {}", self.name, self.index_type)
    }
}

/// A table column and the index memberships it participates in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data_type: String,
    max_length: Option<i64>,
    indexes: Vec<Index>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, max_length: Option<i64>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            max_length,
            indexes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn max_length(&self) -> Option<i64> {
        self.max_length
    }

    /// Index memberships in discovery order
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Adds an index membership. Returns false if the same membership is
    /// already present.
    pub fn add_index(&mut self, index: Index) -> bool {
        if self.indexes.contains(&index) {
            return false;
        }
        self.indexes.push(index);
        true
    }

    /// Finds the membership with the same identity as `index`
    pub fn find_index(&self, index: &Index) -> Option<&Index> {
        self.indexes.iter().find(|i| *i == index)
    }

    pub fn find_index_of_type(
        &self,
        name: &str,
        ordinal: u32,
        index_type: &IndexType,
    ) -> Option<&Index> {
        self.indexes
            .iter()
            .find(|i| i.name == name && i.ordinal == ordinal && &i.index_type == index_type)
    }

    /// True iff every membership of `self` also exists on `other`.
    ///
    /// One-directional: memberships present only on `other` are ignored.
    pub fn is_index_same(&self, other: &Column) -> bool {
        self.indexes.iter().all(|i| other.find_index(i).is_some())
    }

    /// Memberships of `self` with no match on `other`. Every membership is
    /// missing when there is no `other`.
    pub fn missing_indexes_in(&self, other: Option<&Column>) -> Vec<Index> {
        self.indexes
            .iter()
            .filter(|i| other.and_then(|o| o.find_index(i)).is_none())
            .cloned()
            .collect()
    }

    /// Index names joined by `", "`
    pub fn formatted_indexes(&self) -> String {
        self.indexes
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// Index membership is compared separately, behind the check-indexes switch.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.max_length == other.max_length
    }
}

impl Eq for Column {}

impl std::hash::Hash for Column {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.data_type.hash(state);
        self.max_length.hash(state);
    }
}

/// Kind of relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TableType {
    BaseTable,
    View,
    Other(String),
}

impl TableType {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "BASE TABLE" => TableType::BaseTable,
            "VIEW" => TableType::View,
            other => TableType::Other(other.to_string()),
        }
    }

    /// The catalog's own spelling
    pub fn as_raw(&self) -> &str {
        match self {
            TableType::BaseTable => "BASE TABLE",
            TableType::View => "VIEW",
            TableType::Other(raw) => raw,
        }
    }

    /// `"Table"` for base tables, the raw spelling for everything else
    pub fn display(&self) -> &str {
        match self {
            TableType::BaseTable => "Table",
            other => other.as_raw(),
        }
    }
}

impl From<String> for TableType {
    fn from(raw: String) -> Self {
        TableType::from_raw(&raw)
    }
}

impl From<TableType> for String {
    fn from(table_type: TableType) -> Self {
        table_type.as_raw().to_string()
    }
}

/// Lookup key of a table within a snapshot. Orders by schema, then name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableKey {
    pub schema: String,
    pub name: String,
}

impl TableKey {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}].[{}]", self.schema, self.name)
    }
}

/// A schema-qualified table or view
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: String,
    table_type: TableType,
    columns: IndexMap<String, Column>,
    indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: impl Into<String>, table_type: TableType) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            table_type,
            columns: IndexMap::new(),
            indexes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table_type(&self) -> &TableType {
        &self.table_type
    }

    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, &self.name)
    }

    /// `[schema].[name]`
    pub fn qualified_name(&self) -> String {
        format!("[{}].[{}]", self.schema, self.name)
    }

    pub fn type_display(&self) -> &str {
        self.table_type.display()
    }

    /// Adds a column. Returns false, leaving the table untouched, if a column
    /// with the same name already exists.
    pub fn add_column(&mut self, column: Column) -> bool {
        if self.columns.contains_key(column.name()) {
            return false;
        }
        self.columns.insert(column.name().to_string(), column);
        true
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn find_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Columns in enumeration order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Table-scoped index memberships. Auxiliary; columns hold the
    /// authoritative copy.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn add_index(&mut self, index: Index) -> bool {
        if self.indexes.contains(&index) {
            return false;
        }
        self.indexes.push(index);
        true
    }

    /// True iff every column of `self` exists on `other` with the same index
    /// memberships (one-directional, see [`Column::is_index_same`]).
    pub fn is_indexing_same(&self, other: &Table) -> bool {
        self.columns().all(|column| {
            other
                .find_column(column.name())
                .is_some_and(|target| column.is_index_same(target))
        })
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.schema == other.schema
            && self.table_type == other.table_type
            && self.columns.len() == other.columns.len()
            && self
                .columns()
                .all(|c| other.find_column(c.name()).is_some_and(|o| o == c))
    }
}

impl Eq for Table {}

/// Which catalog listing a malformed row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowSource {
    Table,
    Column,
    IndexColumn,
}

/// Why a catalog row was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MalformedReason {
    MissingField(&'static str),
    InvalidOrdinal(i64),
    Duplicate,
}

/// A catalog row that was skipped while building a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRow {
    pub source: RowSource,
    pub reason: MalformedReason,
    /// Whatever identity the row did carry, for the log line
    pub context: String,
}

impl fmt::Display for MalformedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.source {
            RowSource::Table => "table",
            RowSource::Column => "column",
            RowSource::IndexColumn => "index column",
        };
        match &self.reason {
            MalformedReason::MissingField(field) => {
                write!(f, "skipped {} row {}: missing {}", kind, self.context, field)
            }
            MalformedReason::InvalidOrdinal(ordinal) => {
                write!(f, "skipped {} row {}: invalid ordinal {}", kind, self.context, ordinal)
            }
            MalformedReason::Duplicate => {
                write!(f, "skipped {} row {}: duplicate", kind, self.context)
            }
        }
    }
}

/// Outcome of attaching an index fact to a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAttach {
    Attached,
    Duplicate,
    UnknownTable,
    UnknownColumn,
}

/// Every table of one database at one point in time
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    tables: BTreeMap<TableKey, Table>,
    skipped_rows: Vec<MalformedRow>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a table. Returns false, keeping the existing one, if the
    /// `(schema, name)` pair is taken.
    pub fn insert_table(&mut self, table: Table) -> bool {
        let key = table.key();
        if self.tables.contains_key(&key) {
            return false;
        }
        self.tables.insert(key, table);
        true
    }

    pub fn find_table(&self, name: &str, schema: &str) -> Option<&Table> {
        self.tables.get(&TableKey::new(schema, name))
    }

    pub fn find_table_mut(&mut self, name: &str, schema: &str) -> Option<&mut Table> {
        self.tables.get_mut(&TableKey::new(schema, name))
    }

    /// Tables ordered by schema, then name
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_keys(&self) -> impl Iterator<Item = &TableKey> {
        self.tables.keys()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of distinct schemas
    pub fn schema_count(&self) -> usize {
        self.tables
            .keys()
            .map(|k| k.schema.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Attaches one (table, column, index) fact to the matching column and
    /// to the table-scoped index list.
    pub fn attach_index(
        &mut self,
        schema: &str,
        table_name: &str,
        column_name: &str,
        index: Index,
    ) -> IndexAttach {
        let Some(table) = self.find_table_mut(table_name, schema) else {
            return IndexAttach::UnknownTable;
        };
        let Some(column) = table.find_column_mut(column_name) else {
            return IndexAttach::UnknownColumn;
        };
        if !column.add_index(index.clone()) {
            return IndexAttach::Duplicate;
        }
        table.add_index(index);
        IndexAttach::Attached
    }

    pub fn record_skipped(&mut self, row: MalformedRow) {
        self.skipped_rows.push(row);
    }

    /// Catalog rows skipped while this snapshot was built
    pub fn skipped_rows(&self) -> &[MalformedRow] {
        &self.skipped_rows
    }
}
