//! dbcmp core - shared types and collaborator traits
//!
//! This crate provides the vocabulary every other dbcmp crate depends on:
//!
//! - `Connection` - a live connection to one database
//! - `DatabaseDriver` - opens connections from a `ConnectionConfig`
//! - `Catalog` - the catalog enumeration contract used to build schema snapshots
//! - Common types like `Value`, `Row`, `QueryResult` and the `DbcmpError` taxonomy

mod connection;
mod driver;
mod error;
mod schema;
mod types;

pub use connection::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
