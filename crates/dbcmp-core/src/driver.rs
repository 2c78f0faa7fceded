//! Database driver trait definition

use crate::{Connection, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Core driver trait that all database drivers must implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "mssql")
    fn id(&self) -> &'static str;

    /// Display name
    fn display_name(&self) -> &'static str {
        self.id()
    }

    /// Default connection port
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Connection string format help text
    fn connection_string_help(&self) -> &'static str {
        ""
    }

    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Parse a connection string into a configuration
    fn parse_connection_string(&self, _conn_str: &str) -> Result<ConnectionConfig> {
        Err(crate::DbcmpError::NotSupported(
            "Connection string parsing not implemented for this driver".into(),
        ))
    }
}

/// Connection configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Driver ID (e.g., "mssql")
    pub driver: String,
    /// Host address
    pub host: String,
    /// Port number (0 for the driver default)
    pub port: u16,
    /// Database name
    pub database: Option<String>,
    /// Username (None for integrated authentication)
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Additional connection parameters
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create a new configuration with default values
    pub fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            ..Default::default()
        }
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Get a string parameter
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Some(val) = self.params.get(key) {
            return Some(val.clone());
        }
        match key {
            "host" => Some(self.host.clone()),
            "database" => self.database.clone(),
            "username" | "user" => self.username.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }

    /// Get a boolean parameter, accepting `true`/`yes`/`1` case-insensitively
    pub fn get_flag(&self, key: &str) -> bool {
        self.params
            .get(key)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "1"))
            .unwrap_or(false)
    }

    /// Short human-readable target description with no credentials in it
    pub fn display_target(&self) -> String {
        match &self.database {
            Some(db) => format!("{}:{}/{}", self.host, self.port, db),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_take_precedence() {
        let mut config = ConnectionConfig::new("mssql");
        config.host = "db1".into();
        let config = config.with_param("host", "override");
        assert_eq!(config.get_string("host").as_deref(), Some("override"));
    }

    #[test]
    fn test_get_flag_variants() {
        let config = ConnectionConfig::new("mssql")
            .with_param("a", "True")
            .with_param("b", "yes")
            .with_param("c", "0");
        assert!(config.get_flag("a"));
        assert!(config.get_flag("b"));
        assert!(!config.get_flag("c"));
        assert!(!config.get_flag("missing"));
    }

    #[test]
    fn test_display_target_hides_credentials() {
        let mut config = ConnectionConfig::new("mssql");
        config.host = "sql.internal".into();
        config.port = 1433;
        config.database = Some("Sales".into());
        config.password = Some("secret".into());
        let shown = config.display_target();
        assert_eq!(shown, "sql.internal:1433/Sales");
        assert!(!shown.contains("secret"));
    }
}
