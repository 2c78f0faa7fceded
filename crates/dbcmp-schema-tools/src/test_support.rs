//! In-memory catalog and driver fakes shared by the unit tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dbcmp_core::{
    Catalog, ColumnRow, Connection, ConnectionConfig, DatabaseDriver, DbcmpError, IndexColumnRow,
    QueryResult, Result, TableRow, Value,
};

use crate::snapshot::{Column, Index, IndexType, Snapshot, Table, TableType};

/// Which catalog call a [`StaticCatalog`] should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    ListTables,
    ListColumns,
    ListIndexColumns,
}

/// Catalog serving canned rows
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub tables: Vec<TableRow>,
    pub columns: HashMap<(String, String), Vec<ColumnRow>>,
    pub index_columns: Vec<IndexColumnRow>,
    pub fail_on: Option<FailOn>,
    /// Times `list_tables` yields to the scheduler before answering
    pub yields: usize,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, schema: &str, name: &str, columns: Vec<ColumnRow>) -> Self {
        self.tables.push(TableRow::new(schema, name, "BASE TABLE"));
        self.columns
            .insert((schema.to_string(), name.to_string()), columns);
        self
    }

    pub fn index(mut self, row: IndexColumnRow) -> Self {
        self.index_columns.push(row);
        self
    }

    pub fn failing(mut self, fail_on: FailOn) -> Self {
        self.fail_on = Some(fail_on);
        self
    }

    pub fn yielding(mut self, yields: usize) -> Self {
        self.yields = yields;
        self
    }

    fn check(&self, call: FailOn) -> Result<()> {
        if self.fail_on == Some(call) {
            return Err(DbcmpError::Catalog(format!("{:?} failed", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn list_tables(&self) -> Result<Vec<TableRow>> {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        self.check(FailOn::ListTables)?;
        Ok(self.tables.clone())
    }

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnRow>> {
        self.check(FailOn::ListColumns)?;
        Ok(self
            .columns
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_index_columns(&self) -> Result<Vec<IndexColumnRow>> {
        self.check(FailOn::ListIndexColumns)?;
        Ok(self.index_columns.clone())
    }
}

/// Connection backed by a [`StaticCatalog`] that records whether it was closed
pub struct FakeConnection {
    catalog: StaticCatalog,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Connection for FakeConnection {
    fn driver_name(&self) -> &str {
        "fake"
    }

    async fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
        Ok(QueryResult::empty())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_catalog(&self) -> Option<&dyn Catalog> {
        Some(&self.catalog)
    }
}

/// Driver handing out [`FakeConnection`]s keyed by `ConnectionConfig::host`
#[derive(Default)]
pub struct FakeDriver {
    catalogs: HashMap<String, StaticCatalog>,
    pub closed: HashMap<String, Arc<AtomicBool>>,
    pub connects: Arc<AtomicUsize>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, host: &str, catalog: StaticCatalog) -> Self {
        self.catalogs.insert(host.to_string(), catalog);
        self.closed
            .insert(host.to_string(), Arc::new(AtomicBool::new(false)));
        self
    }

    pub fn was_closed(&self, host: &str) -> bool {
        self.closed
            .get(host)
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl DatabaseDriver for FakeDriver {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let (Some(catalog), Some(closed)) =
            (self.catalogs.get(&config.host), self.closed.get(&config.host))
        else {
            return Err(DbcmpError::Connection(format!(
                "no such host: {}",
                config.host
            )));
        };
        Ok(Arc::new(FakeConnection {
            catalog: catalog.clone(),
            closed: closed.clone(),
        }))
    }
}

pub fn config_for(host: &str) -> ConnectionConfig {
    let mut config = ConnectionConfig::new("fake");
    config.host = host.to_string();
    config
}

pub fn column(name: &str, data_type: &str, max_length: Option<i64>) -> Column {
    Column::new(name, data_type, max_length)
}

pub fn indexed_column(name: &str, data_type: &str, indexes: &[(&str, u32, &str)]) -> Column {
    let mut column = Column::new(name, data_type, None);
    for (index_name, ordinal, tag) in indexes {
        column.add_index(Index::new(*index_name, IndexType::from_tag(tag), *ordinal));
    }
    column
}

pub fn table(schema: &str, name: &str, columns: Vec<Column>) -> Table {
    let mut table = Table::new(name, schema, TableType::BaseTable);
    for column in columns {
        table.add_column(column);
    }
    table
}

pub fn snapshot(tables: Vec<Table>) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for table in tables {
        snapshot.insert_table(table);
    }
    snapshot
}
