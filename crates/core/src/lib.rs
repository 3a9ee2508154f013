//! Savetrack Core - Domain entities, services, and traits.
//!
//! This crate contains the goal ledger and its business rules.
//! It is storage-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `storage-file` crates.

pub mod constants;
pub mod errors;
pub mod goals;
pub mod users;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
