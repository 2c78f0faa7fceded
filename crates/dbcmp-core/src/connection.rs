//! Connection trait

use crate::{Catalog, QueryResult, Result, Value};
use async_trait::async_trait;

/// A database connection
///
/// Connections are owned by exactly one snapshot fetch and closed explicitly
/// once the fetch finishes, whether it succeeded or not.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "mssql")
    fn driver_name(&self) -> &str;

    /// Execute a parameterized query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get the catalog enumeration interface if supported
    fn as_catalog(&self) -> Option<&dyn Catalog> {
        None
    }
}
