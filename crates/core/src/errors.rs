//! Core error types for the Stockhaus warehouse.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage
//! layer.

use chrono::ParseError as ChronoParseError;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the warehouse.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Structural input error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Quality score {score:.1} below acceptance threshold {min_score:.1}")]
    QualityGate { score: f64, min_score: f64 },

    #[error("Data source error: {0}")]
    Source(String),

    #[error("Asset operation failed: {0}")]
    Asset(String),

    #[error("Batch operation failed: {0}")]
    Batch(String),

    #[error("Gold view refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// The storage layer converts its backend-specific errors (Diesel, r2d2)
/// into this format. The split between statement-level variants
/// (`QueryFailed`, constraint violations) and connection-level variants
/// (`ConnectionFailed`, `PoolCreationFailed`, `TransactionFailed`) matters:
/// the price loader skips rows on the former and aborts on the latter.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database statement failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DatabaseError {
    /// Whether this failure invalidates the connection rather than a single
    /// statement. Connection-level failures abort a load; statement-level
    /// failures are recoverable per row.
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_)
                | DatabaseError::PoolCreationFailed(_)
                | DatabaseError::TransactionFailed(_)
        )
    }
}

/// Structural problems with an input file, raised before any persistence.
#[derive(Error, Debug)]
pub enum StructuralError {
    #[error("input file not found: {0}")]
    FileNotFound(String),

    #[error("input file could not be read: {0}")]
    Unreadable(String),

    #[error("input file has no data rows: {0}")]
    EmptyInput(String),

    #[error("input file has no usable header row: {0}")]
    MissingHeader(String),
}

/// Validation errors for per-row data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Failed to parse integer: {0}")]
    IntegerParse(#[from] ParseIntError),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Gold view refresh failures.
///
/// A non-blocking failure is retried once in blocking mode by the
/// coordinator; only the residual blocking failure reaches callers.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("non-blocking refresh of '{view}' failed: {reason}")]
    NonBlockingFailed { view: String, reason: String },

    #[error("blocking refresh of '{view}' failed: {reason}")]
    BlockingFailed { view: String, reason: String },
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
