//! Schema comparison module
//!
//! Reconciles a source snapshot against a target snapshot and produces a
//! structured diff plus summary statistics.

mod comparator;
mod diff;
mod statistics;


pub use comparator::*;
pub use diff::*;
pub use statistics::*;
