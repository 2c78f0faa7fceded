//! MS SQL Server catalog queries

use async_trait::async_trait;
use dbcmp_core::{
    Catalog, ColumnRow, Connection, DbcmpError, IndexColumnRow, QueryResult, Result, Row,
    TableRow, Value,
};

use super::MssqlConnection;

pub(crate) const LIST_TABLES_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE
     FROM INFORMATION_SCHEMA.TABLES";

pub(crate) const LIST_COLUMNS_SQL: &str = "SELECT
        COLUMN_NAME,
        DATA_TYPE,
        CAST(CHARACTER_MAXIMUM_LENGTH AS BIGINT) AS MAX_LENGTH
     FROM INFORMATION_SCHEMA.COLUMNS
     WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2
     ORDER BY ORDINAL_POSITION";

pub(crate) const LIST_INDEX_COLUMNS_SQL: &str = "SELECT DISTINCT
        SCHEMA_NAME(t.schema_id) AS SchemaName,
        t.name AS TableName,
        c.name AS ColumnName,
        i.name AS IndexName,
        i.type_desc AS IndexType,
        CAST(ic.key_ordinal AS INT) AS ColumnOrdinal
     FROM sys.indexes i
     INNER JOIN sys.tables t ON t.object_id = i.object_id
     INNER JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id
     INNER JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id
     ORDER BY SchemaName, TableName, IndexName, ColumnOrdinal";

#[async_trait]
impl Catalog for MssqlConnection {
    /// List every table and view in the current database
    #[tracing::instrument(skip(self))]
    async fn list_tables(&self) -> Result<Vec<TableRow>> {
        let result = catalog_query(self, "list tables", LIST_TABLES_SQL, &[]).await?;
        Ok(result.rows.iter().map(table_row).collect())
    }

    /// List the columns of one table in ordinal order
    #[tracing::instrument(skip(self))]
    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnRow>> {
        let params = [
            Value::String(schema.to_string()),
            Value::String(table.to_string()),
        ];
        let result = catalog_query(self, "list columns", LIST_COLUMNS_SQL, &params).await?;
        Ok(result.rows.iter().map(column_row).collect())
    }

    /// List every index key and include column of every user table
    #[tracing::instrument(skip(self))]
    async fn list_index_columns(&self) -> Result<Vec<IndexColumnRow>> {
        let result = catalog_query(self, "list index columns", LIST_INDEX_COLUMNS_SQL, &[]).await?;
        Ok(result.rows.iter().map(index_column_row).collect())
    }
}

/// Runs a catalog query, reporting any failure as a catalog error
async fn catalog_query(
    connection: &MssqlConnection,
    call: &str,
    sql: &str,
    params: &[Value],
) -> Result<QueryResult> {
    connection
        .query(sql, params)
        .await
        .map_err(|e| DbcmpError::Catalog(format!("{} failed: {}", call, e)))
}

pub(crate) fn table_row(row: &Row) -> TableRow {
    TableRow {
        schema: row.get_string("TABLE_SCHEMA"),
        name: row.get_string("TABLE_NAME"),
        table_type: row.get_string("TABLE_TYPE"),
    }
}

pub(crate) fn column_row(row: &Row) -> ColumnRow {
    ColumnRow {
        name: row.get_string("COLUMN_NAME"),
        data_type: row.get_string("DATA_TYPE"),
        max_length: row.get_i64("MAX_LENGTH"),
    }
}

pub(crate) fn index_column_row(row: &Row) -> IndexColumnRow {
    IndexColumnRow {
        schema: row.get_string("SchemaName"),
        table_name: row.get_string("TableName"),
        column_name: row.get_string("ColumnName"),
        index_name: row.get_string("IndexName"),
        index_type: row.get_string("IndexType"),
        ordinal: row.get_i64("ColumnOrdinal"),
    }
}
