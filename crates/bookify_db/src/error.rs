//! Error types for the database client

use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A uniqueness constraint rejected the write. For bookings this is the
    /// active-slot index, i.e. the slot is already taken.
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A stored row could not be mapped back into a model
    #[error("Row decode error: {0}")]
    DecodeError(String),
}

/// Classifies a sqlx execution error, pulling uniqueness violations out into
/// their own variant so callers can map them to a slot conflict.
pub fn classify_sqlx_error(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(ref db_err) = err {
        let message = db_err.message().to_string();
        if message.to_uppercase().contains("UNIQUE") || message.contains("duplicate key") {
            return DbError::UniqueViolation(message);
        }
    }
    DbError::QueryError(err.to_string())
}
