// --- File: crates/bookify_common/src/error.rs ---
use thiserror::Error;

/// The base error type shared across Bookify crates.
///
/// Feature crates define their own error enums and convert into this one
/// at the transport boundary. Each variant carries a caller-facing message;
/// nothing here is swallowed silently.
#[derive(Error, Debug)]
pub enum BookifyError {
    /// Malformed or missing input; no mutation happened
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Unknown resource id
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Requested resource is already taken
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Authentication or signature check failed
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during a database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error during an external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Anything else
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// Implemented by every error enum that reaches an axum handler so the
/// status mapping lives next to the error definition.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BookifyError {
    fn status_code(&self) -> u16 {
        match self {
            BookifyError::ValidationError(_) => 422,
            BookifyError::NotFoundError(_) => 404,
            BookifyError::ConflictError(_) => 422,
            BookifyError::AuthError(_) => 400,
            BookifyError::DatabaseError(_) => 500,
            BookifyError::ExternalServiceError { .. } => 502,
            BookifyError::ConfigError(_) => 500,
            BookifyError::ParseError(_) => 400,
            BookifyError::InternalError(_) => 500,
        }
    }
}

