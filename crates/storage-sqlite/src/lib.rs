//! SQLite storage implementation for Stockhaus.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `stockhaus-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for staging, assets, sources, batches,
//!   price facts, and the gold view
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! All writes funnel through a single-writer actor ([`WriteHandle`]) that
//! wraps each job in an immediate transaction. That single writer is what
//! makes purge-then-write staging and gold refreshes safe while several
//! files load concurrently.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod assets;
pub mod batches;
pub mod gold;
pub mod prices;
pub mod sources;
pub mod staging;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from stockhaus-core for convenience
pub use stockhaus_core::errors::{DatabaseError, Error, Result};
