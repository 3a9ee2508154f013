//! SQLite storage implementation for Savetrack.
//!
//! This crate holds every Diesel dependency in the workspace. It implements
//! the store traits defined in `savetrack-core`:
//! - connection pooling and the single-writer actor
//! - embedded Diesel migrations
//! - `GoalRepository` (per-owner goal collections)
//! - `UserRepository` (API users and their key hashes)
//!
//! ```text
//! core (domain)      server (HTTP)
//!       │                 │
//!       └────────┬────────┘
//!                │
//!                ▼
//!       storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

pub mod goals;
pub mod users;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use savetrack_core::errors::{DatabaseError, Error, Result};
