//! Tests for MS SQL Server connection module

use crate::connection::{
    MssqlConnection, MssqlConnectionError, MssqlSettings, column_data_to_value,
    values_to_tiberius_params,
};
use dbcmp_core::{Connection, ConnectionConfig, DbcmpError, Value};
use std::borrow::Cow;
use tiberius::ColumnData;

fn config() -> ConnectionConfig {
    let mut config = ConnectionConfig::new("mssql");
    config.host = "sql01".into();
    config.username = Some("sa".into());
    config.password = Some("pw".into());
    config
}

#[test]
fn test_settings_defaults() {
    let settings = MssqlSettings::from_config(&config()).unwrap();
    assert_eq!(settings.host, "sql01");
    assert_eq!(settings.port, 1433);
    assert!(settings.encrypt);
    assert!(!settings.trust_cert);
}

#[test]
fn test_settings_read_flags() {
    let config = config()
        .with_param("trust_cert", "true")
        .with_param("encrypt", "false");
    let settings = MssqlSettings::from_config(&config).unwrap();
    assert!(settings.trust_cert);
    assert!(!settings.encrypt);
}

#[test]
fn test_settings_require_user() {
    let mut config = config();
    config.username = None;
    let settings = MssqlSettings::from_config(&config).unwrap();
    assert!(matches!(
        settings.to_tiberius(),
        Err(MssqlConnectionError::AuthenticationFailed(_))
    ));
}

#[test]
fn test_integrated_security_is_rejected() {
    let config = config().with_param("integrated_security", "true");
    assert!(MssqlSettings::from_config(&config).is_err());
}

#[test]
fn test_error_conversion() {
    let err: DbcmpError = MssqlConnectionError::ConnectionClosed.into();
    assert!(err.is_connection());
    let err: DbcmpError = MssqlConnectionError::QueryFailed("bad".into()).into();
    assert!(matches!(err, DbcmpError::Driver(_)));
}

#[test]
fn test_column_data_nulls() {
    assert_eq!(column_data_to_value(ColumnData::I32(None)).unwrap(), Value::Null);
    assert_eq!(column_data_to_value(ColumnData::String(None)).unwrap(), Value::Null);
    assert_eq!(column_data_to_value(ColumnData::Bit(None)).unwrap(), Value::Null);
}

#[test]
fn test_column_data_integers_widen() {
    assert_eq!(column_data_to_value(ColumnData::U8(Some(7))).unwrap(), Value::Int(7));
    assert_eq!(column_data_to_value(ColumnData::I16(Some(-3))).unwrap(), Value::Int(-3));
    assert_eq!(column_data_to_value(ColumnData::I64(Some(1 << 40))).unwrap(), Value::Int(1 << 40));
}

#[test]
fn test_column_data_string() {
    let value = column_data_to_value(ColumnData::String(Some(Cow::Owned("dbo".into())))).unwrap();
    assert_eq!(value.as_str(), Some("dbo"));
}

#[test]
fn test_column_data_bit() {
    assert_eq!(column_data_to_value(ColumnData::Bit(Some(true))).unwrap(), Value::Bool(true));
}

#[test]
fn test_column_data_outside_catalog_types_is_rejected() {
    assert!(matches!(
        column_data_to_value(ColumnData::F64(Some(1.5))),
        Err(MssqlConnectionError::TypeConversion(_))
    ));
    assert!(matches!(
        column_data_to_value(ColumnData::Binary(None)),
        Err(MssqlConnectionError::TypeConversion(_))
    ));
}

#[tokio::test]
async fn test_close_releases_session() {
    let connection = MssqlConnection::detached(Some("Sales".into()));
    assert!(!connection.is_closed());
    connection.close().await.unwrap();
    assert!(connection.is_closed());
    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_query_without_session_fails() {
    let connection = MssqlConnection::detached(None);
    let err = connection.query("SELECT 1", &[]).await.unwrap_err();
    assert!(err.is_connection());
}

#[test]
fn test_values_to_params() {
    let params = values_to_tiberius_params(&[
        Value::String("dbo".into()),
        Value::String("Users".into()),
        Value::Null,
        Value::Int(3),
        Value::Bool(false),
    ]);
    assert_eq!(params.len(), 5);
}
