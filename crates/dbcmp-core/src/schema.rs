//! Catalog enumeration contract
//!
//! A catalog collaborator exposes the three enumeration calls a schema snapshot
//! is built from. Row fields are optional because real catalogs can hand back
//! NULLs; deciding what to do with an incomplete row is the snapshot loader's job.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Catalog enumeration interface
#[async_trait]
pub trait Catalog: Send + Sync {
    /// List every table and view visible to the connection
    async fn list_tables(&self) -> Result<Vec<TableRow>>;

    /// List the columns of one table, in catalog (ordinal) order
    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnRow>>;

    /// List every (table, column, index) membership fact.
    ///
    /// Rows must be ordered by table, then index, then ordinal.
    async fn list_index_columns(&self) -> Result<Vec<IndexColumnRow>>;
}

/// One row of the table listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub schema: Option<String>,
    pub name: Option<String>,
    pub table_type: Option<String>,
}

impl TableRow {
    pub fn new(schema: &str, name: &str, table_type: &str) -> Self {
        Self {
            schema: Some(schema.to_string()),
            name: Some(name.to_string()),
            table_type: Some(table_type.to_string()),
        }
    }
}

/// One row of a column listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub max_length: Option<i64>,
}

impl ColumnRow {
    pub fn new(name: &str, data_type: &str, max_length: Option<i64>) -> Self {
        Self {
            name: Some(name.to_string()),
            data_type: Some(data_type.to_string()),
            max_length,
        }
    }
}

/// One (table, column, index, ordinal) membership fact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumnRow {
    pub schema: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
    pub index_name: Option<String>,
    pub index_type: Option<String>,
    /// Position in the index key; 0 marks an included column
    pub ordinal: Option<i64>,
}

impl IndexColumnRow {
    pub fn new(
        schema: &str,
        table_name: &str,
        column_name: &str,
        index_name: &str,
        index_type: &str,
        ordinal: i64,
    ) -> Self {
        Self {
            schema: Some(schema.to_string()),
            table_name: Some(table_name.to_string()),
            column_name: Some(column_name.to_string()),
            index_name: Some(index_name.to_string()),
            index_type: Some(index_type.to_string()),
            ordinal: Some(ordinal),
        }
    }
}
