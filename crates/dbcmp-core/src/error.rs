//! Error types for dbcmp

use thiserror::Error;

/// Core error type for dbcmp operations
///
/// Structural and connectivity failures are fatal and surface to the caller.
/// Data-quality problems in individual catalog rows never become a `DbcmpError`;
/// they are skipped and logged while the snapshot is built.
#[derive(Error, Debug)]
pub enum DbcmpError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl DbcmpError {
    /// Whether the error came from establishing or holding a connection
    pub fn is_connection(&self) -> bool {
        matches!(self, DbcmpError::Connection(_))
    }

    /// Whether the error came from a failed catalog enumeration call
    pub fn is_catalog(&self) -> bool {
        matches!(self, DbcmpError::Catalog(_))
    }
}

/// Result type alias for dbcmp operations
pub type Result<T> = std::result::Result<T, DbcmpError>;
