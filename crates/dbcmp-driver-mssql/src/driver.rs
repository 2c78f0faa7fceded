//! MS SQL Server driver implementation

use crate::connection::{DEFAULT_PORT, MssqlConnection};
use async_trait::async_trait;
use dbcmp_core::{Connection, ConnectionConfig, DatabaseDriver, Result};
use std::sync::Arc;

/// MS SQL Server database driver
pub struct MssqlDriver;

impl MssqlDriver {
    /// Create a new MS SQL Server driver instance
    pub fn new() -> Self {
        tracing::debug!("MS SQL Server driver initialized");
        Self
    }
}

impl Default for MssqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MssqlDriver {
    fn id(&self) -> &'static str {
        "mssql"
    }

    fn display_name(&self) -> &'static str {
        "MS SQL Server"
    }

    fn default_port(&self) -> Option<u16> {
        Some(DEFAULT_PORT)
    }

    fn connection_string_help(&self) -> &'static str {
        "Server=host,port;Database=dbname;User Id=user;Password=pass;TrustServerCertificate=True"
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = config.database.as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        tracing::debug!("connecting to MS SQL Server");
        let connection = MssqlConnection::from_config(config).await?;
        Ok(Arc::new(connection))
    }

    fn parse_connection_string(&self, conn_str: &str) -> Result<ConnectionConfig> {
        crate::connection_string::parse_connection_string(conn_str)
    }
}
