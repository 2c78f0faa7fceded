//! Schema snapshot module
//!
//! The in-memory picture of one database's structure and the loader that
//! builds it from a catalog collaborator.

mod loader;
mod model;

#[cfg(test)]
mod tests;

pub use loader::*;
pub use model::*;
