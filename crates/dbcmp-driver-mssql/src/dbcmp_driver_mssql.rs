//! MS SQL Server driver for dbcmp
//!
//! Provides the connection, the ADO.NET connection-string parser and the
//! catalog queries a schema snapshot is built from.

mod catalog;
mod connection;
mod connection_string;
mod driver;

#[cfg(test)]
mod catalog_tests;
#[cfg(test)]
mod connection_string_tests;
#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::{MssqlConnection, MssqlConnectionError};
pub use connection_string::parse_connection_string;
pub use driver::MssqlDriver;
