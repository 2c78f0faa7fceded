//! Unit tests for MS SQL Server driver

use super::*;
use dbcmp_core::DatabaseDriver;

#[test]
fn test_mssql_driver_id() {
    let driver = MssqlDriver::new();
    assert_eq!(driver.id(), "mssql");
    assert_eq!(driver.display_name(), "MS SQL Server");
}

#[test]
fn test_mssql_default_port() {
    let driver = MssqlDriver::new();
    assert_eq!(driver.default_port(), Some(1433));
}

#[test]
fn test_connection_string_help_names_keys() {
    let help = MssqlDriver::new().connection_string_help();
    assert!(help.contains("Server="));
    assert!(help.contains("User Id="));
}

#[test]
fn test_driver_parses_connection_strings() {
    let driver = MssqlDriver::new();
    let config = driver
        .parse_connection_string("Server=localhost;Database=master;User Id=sa;Password=pw")
        .unwrap();
    assert_eq!(config.display_target(), "localhost:1433/master");
}

#[tokio::test]
async fn test_connect_rejects_integrated_security() {
    let driver = MssqlDriver::new();
    let config = driver
        .parse_connection_string("Server=localhost;Trusted_Connection=True")
        .unwrap();
    let err = driver.connect(&config).await.err().unwrap();
    assert!(err.is_connection());
}
