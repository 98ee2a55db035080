// --- File: crates/bookify_booking/src/error.rs ---
use axum::response::{IntoResponse, Response};
use bookify_common::{error_response, BookifyError, HttpStatusCode};
use bookify_db::DbError;
use thiserror::Error;

/// Booking-specific error types.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Malformed or missing input; nothing was created or changed
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// The requested slot is already held by a non-cancelled booking
    #[error("This time slot is no longer available. Please select another time.")]
    SlotConflict,

    /// Unknown resource id
    #[error("{0} not found.")]
    NotFound(&'static str),

    /// The payment gateway call failed; an already-created booking stays
    /// persisted and unpaid
    #[error("Payment initialization failed: {0}")]
    Payment(String),

    /// Persistence failure
    #[error("Database error: {0}")]
    Database(String),
}

impl BookingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DbError> for BookingError {
    fn from(err: DbError) -> Self {
        match err {
            // The active-slot unique index caught a double-booking the
            // read-side check missed (concurrent insert)
            DbError::UniqueViolation(_) => BookingError::SlotConflict,
            other => BookingError::Database(other.to_string()),
        }
    }
}

impl From<BookingError> for BookifyError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation { field, message } => {
                BookifyError::ValidationError(format!("{}: {}", field, message))
            }
            BookingError::SlotConflict => BookifyError::ConflictError(err.to_string()),
            BookingError::NotFound(what) => BookifyError::NotFoundError(what.to_string()),
            BookingError::Payment(msg) => BookifyError::ExternalServiceError {
                service_name: "payment gateway".to_string(),
                message: msg,
            },
            BookingError::Database(msg) => BookifyError::DatabaseError(msg),
        }
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Validation { .. } => 422,
            BookingError::SlotConflict => 422,
            BookingError::NotFound(_) => 404,
            BookingError::Payment(_) => 500,
            BookingError::Database(_) => 500,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        error_response(&self)
    }
}
