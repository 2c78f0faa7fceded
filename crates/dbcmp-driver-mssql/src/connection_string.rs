//! ADO.NET-style connection strings
//!
//! `Server=host,1433;Database=Sales;User Id=sa;Password=...;TrustServerCertificate=True`
//!
//! Keys are matched case-insensitively. Recognised keys are folded into the
//! typed fields of [`ConnectionConfig`]; anything else is kept verbatim in
//! `params` under its lower-cased key.

use dbcmp_core::{ConnectionConfig, DbcmpError, Result};

use crate::connection::DEFAULT_PORT;

/// Parses a `key=value;...` connection string into a configuration for the
/// `mssql` driver
pub fn parse_connection_string(input: &str) -> Result<ConnectionConfig> {
    let mut config = ConnectionConfig::new("mssql");
    config.port = DEFAULT_PORT;
    let mut has_server = false;

    for segment in input.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let Some((key, value)) = segment.split_once('=') else {
            return Err(DbcmpError::Configuration(format!(
                "connection string segment '{}' is not key=value",
                redact(segment)
            )));
        };
        let key = key.trim().to_ascii_lowercase();
        let value = unquote(value.trim());

        match key.as_str() {
            "server" | "data source" | "address" | "addr" | "network address" => {
                let (host, port) = parse_server(value)?;
                config.host = host;
                if let Some(port) = port {
                    config.port = port;
                }
                has_server = true;
            }
            "database" | "initial catalog" => config.database = Some(value.to_string()),
            "user id" | "uid" | "user" => config.username = Some(value.to_string()),
            "password" | "pwd" => config.password = Some(value.to_string()),
            "trustservercertificate" | "trust server certificate" => {
                config.params.insert("trust_cert".into(), parse_bool(&key, value)?.to_string());
            }
            "encrypt" => {
                config.params.insert("encrypt".into(), parse_bool(&key, value)?.to_string());
            }
            "integrated security" | "trusted_connection" => {
                config
                    .params
                    .insert("integrated_security".into(), parse_bool(&key, value)?.to_string());
            }
            _ => {
                config.params.insert(key.clone(), value.to_string());
            }
        }
    }

    if !has_server {
        return Err(DbcmpError::Configuration(
            "connection string has no Server".to_string(),
        ));
    }
    Ok(config)
}

/// `tcp:host,port`, `host,port` or `host`
fn parse_server(value: &str) -> Result<(String, Option<u16>)> {
    let value = match value.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("tcp:") => &value[4..],
        _ => value,
    };
    match value.split_once(',') {
        Some((host, port)) => {
            let port = port.trim().parse::<u16>().map_err(|_| {
                DbcmpError::Configuration(format!("invalid port '{}' in Server", port.trim()))
            })?;
            Ok((host.trim().to_string(), Some(port)))
        }
        None => Ok((value.trim().to_string(), None)),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "sspi" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(DbcmpError::Configuration(format!(
            "invalid value '{}' for '{}'",
            other, key
        ))),
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

// Keeps passwords out of error messages.
fn redact(segment: &str) -> String {
    let lower = segment.to_ascii_lowercase();
    if lower.contains("password") || lower.contains("pwd") {
        "<redacted>".to_string()
    } else {
        segment.to_string()
    }
}
