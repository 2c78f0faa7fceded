//! dbcmp schema tools - schema snapshots, comparison and diff reporting
//!
//! This crate provides functionality for:
//! - Capturing a schema snapshot (tables, columns, index memberships) from a catalog
//! - Comparing a source snapshot against a target snapshot
//! - Summarizing per-table statistics
//! - Writing the resulting diff to report sinks

pub mod compare;
pub mod report;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod test_support;

pub use compare::*;
pub use report::*;
pub use session::*;
pub use snapshot::*;
