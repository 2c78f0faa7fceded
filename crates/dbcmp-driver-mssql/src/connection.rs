//! MS SQL Server connection implementation using tiberius

use async_trait::async_trait;
use dbcmp_core::{Catalog, Connection, ConnectionConfig, DbcmpError, QueryResult, Result, Row, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Row as TiberiusRow};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// Port used when the configuration does not name one
pub const DEFAULT_PORT: u16 = 1433;

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for DbcmpError {
    fn from(err: MssqlConnectionError) -> Self {
        match err {
            MssqlConnectionError::ConnectionFailed(_)
            | MssqlConnectionError::AuthenticationFailed(_)
            | MssqlConnectionError::ConnectionClosed
            | MssqlConnectionError::Io(_) => DbcmpError::Connection(err.to_string()),
            MssqlConnectionError::QueryFailed(_)
            | MssqlConnectionError::TypeConversion(_)
            | MssqlConnectionError::Tiberius(_) => DbcmpError::Driver(err.to_string()),
        }
    }
}

/// Settings extracted from a [`ConnectionConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MssqlSettings {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub trust_cert: bool,
    /// `Encrypt=false` downgrades from required TLS to login-only encryption
    pub encrypt: bool,
}

impl MssqlSettings {
    pub fn from_config(config: &ConnectionConfig) -> std::result::Result<Self, MssqlConnectionError> {
        if config.get_flag("integrated_security") {
            return Err(MssqlConnectionError::AuthenticationFailed(
                "integrated authentication is not supported, supply User Id and Password".to_string(),
            ));
        }

        let host = config
            .get_string("host")
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        let port = if config.port > 0 { config.port } else { DEFAULT_PORT };
        let encrypt = !config
            .params
            .get("encrypt")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "false" | "no" | "0"));

        Ok(Self {
            host,
            port,
            database: config.get_string("database"),
            username: config.get_string("username"),
            password: config.get_string("password"),
            trust_cert: config.get_flag("trust_cert"),
            encrypt,
        })
    }

    pub fn to_tiberius(&self) -> std::result::Result<Config, MssqlConnectionError> {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);

        if let Some(db) = &self.database {
            config.database(db);
        }

        if self.trust_cert {
            config.trust_cert();
        }

        config.encryption(if self.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::Off
        });

        let Some(user) = &self.username else {
            return Err(MssqlConnectionError::AuthenticationFailed(
                "no User Id in connection string".to_string(),
            ));
        };
        config.authentication(AuthMethod::sql_server(
            user,
            self.password.as_deref().unwrap_or(""),
        ));
        Ok(config)
    }
}

/// MS SQL Server connection using tiberius
///
/// The client is taken out on `close` and the TDS session shut down; later
/// queries fail with [`MssqlConnectionError::ConnectionClosed`].
pub struct MssqlConnection {
    client: Mutex<Option<Client<Compat<TcpStream>>>>,
    closed: AtomicBool,
    database: Option<String>,
}

impl MssqlConnection {
    /// Connect using host, port, database, credentials and TLS settings
    /// taken from `config`
    #[tracing::instrument(skip(config), fields(db = %config.display_target()))]
    pub async fn from_config(
        config: &ConnectionConfig,
    ) -> std::result::Result<Self, MssqlConnectionError> {
        let settings = MssqlSettings::from_config(config)?;
        tracing::debug!("connecting to MS SQL Server at {}:{}", settings.host, settings.port);

        let tiberius_config = settings.to_tiberius()?;

        let tcp = TcpStream::connect(tiberius_config.get_addr())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tcp.set_nodelay(true)?;
        let compat_stream = tcp.compat_write();

        let client = Client::connect(tiberius_config, compat_stream)
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("successfully connected to MS SQL Server");

        Ok(Self {
            client: Mutex::new(Some(client)),
            closed: AtomicBool::new(false),
            database: settings.database,
        })
    }

    /// A connection whose session is already gone
    #[cfg(test)]
    pub(crate) fn detached(database: Option<String>) -> Self {
        Self {
            client: Mutex::new(None),
            closed: AtomicBool::new(false),
            database,
        }
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let start = std::time::Instant::now();

        let mut guard = self.client.lock().await;
        let Some(client) = guard.as_mut() else {
            return Err(MssqlConnectionError::ConnectionClosed.into());
        };

        let tiberius_params = values_to_tiberius_params(params);
        let param_refs: Vec<&dyn tiberius::ToSql> = tiberius_params
            .iter()
            .map(|p| p as &dyn tiberius::ToSql)
            .collect();

        let stream = client.query(sql, &param_refs[..]).await.map_err(|e| {
            tracing::error!(error = %e, "query failed");
            MssqlConnectionError::QueryFailed(e.to_string())
        })?;

        let tib_rows = stream
            .into_first_result()
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = tib_rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(tib_rows.len());
        for tib_row in tib_rows {
            rows.push(Row::new(columns.clone(), tiberius_row_to_values(tib_row)?));
        }

        let execution_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = rows.len(),
            duration_ms = execution_time_ms,
            "query completed"
        );

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms,
        })
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            client.close().await.map_err(MssqlConnectionError::from)?;
            tracing::debug!(database = ?self.database, "MS SQL Server connection closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_catalog(&self) -> Option<&dyn Catalog> {
        Some(self)
    }
}

/// Convert a tiberius row to a vector of Values by consuming the row
fn tiberius_row_to_values(row: TiberiusRow) -> std::result::Result<Vec<Value>, MssqlConnectionError> {
    row.into_iter().map(column_data_to_value).collect()
}

/// Convert tiberius ColumnData to a dbcmp Value. Catalog queries only select
/// strings, integers and bits; anything else is a conversion error.
pub(crate) fn column_data_to_value(
    col_data: ColumnData<'static>,
) -> std::result::Result<Value, MssqlConnectionError> {
    let value = match col_data {
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::U8(v) => v.map(|v| Value::Int(v.into())),
        ColumnData::I16(v) => v.map(|v| Value::Int(v.into())),
        ColumnData::I32(v) => v.map(|v| Value::Int(v.into())),
        ColumnData::I64(v) => v.map(Value::Int),
        ColumnData::String(v) => v.map(|v| Value::String(v.into_owned())),
        other => {
            return Err(MssqlConnectionError::TypeConversion(format!(
                "unsupported column type in catalog result: {:?}",
                other
            )));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Container for tiberius parameter values
#[derive(Debug)]
pub(crate) enum TiberiusParam {
    Null,
    Bool(bool),
    I64(i64),
    String(String),
}

impl tiberius::ToSql for TiberiusParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            TiberiusParam::Null => ColumnData::I32(None),
            TiberiusParam::Bool(v) => ColumnData::Bit(Some(*v)),
            TiberiusParam::I64(v) => ColumnData::I64(Some(*v)),
            TiberiusParam::String(v) => {
                ColumnData::String(Some(std::borrow::Cow::Borrowed(v.as_str())))
            }
        }
    }
}

/// Convert dbcmp Values to tiberius parameters
pub(crate) fn values_to_tiberius_params(values: &[Value]) -> Vec<TiberiusParam> {
    values
        .iter()
        .map(|v| match v {
            Value::Null => TiberiusParam::Null,
            Value::Bool(b) => TiberiusParam::Bool(*b),
            Value::Int(i) => TiberiusParam::I64(*i),
            Value::String(s) => TiberiusParam::String(s.clone()),
        })
        .collect()
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("database", &self.database)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
