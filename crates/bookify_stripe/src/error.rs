// --- File: crates/bookify_stripe/src/error.rs ---
use axum::response::{IntoResponse, Response};
use bookify_common::{error_response, BookifyError, HttpStatusCode};
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Malformed input before any gateway call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing a Stripe API response or webhook payload
    #[error("Failed to parse Stripe payload: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration missing or incomplete")]
    ConfigError,

    /// Webhook signature verification failed
    #[error("Stripe webhook signature verification failed: {0}")]
    SignatureError(String),

    /// Webhook event processing error
    #[error("Stripe webhook event processing error: {0}")]
    WebhookProcessingError(String),

    /// Internal processing error
    #[error("Internal processing error: {0}")]
    InternalError(String),
}

/// Convert StripeError to BookifyError
impl From<StripeError> for BookifyError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Validation(msg) => BookifyError::ValidationError(msg),
            StripeError::RequestError(e) => BookifyError::ExternalServiceError {
                service_name: "Stripe API".to_string(),
                message: e.to_string(),
            },
            StripeError::ApiError {
                status_code,
                message,
            } => BookifyError::ExternalServiceError {
                service_name: "Stripe API".to_string(),
                message: format!("Status: {}, Message: {}", status_code, message),
            },
            StripeError::ParseError(e) => BookifyError::ParseError(e.to_string()),
            StripeError::ConfigError => {
                BookifyError::ConfigError("Stripe configuration missing or incomplete".to_string())
            }
            StripeError::SignatureError(msg) => {
                BookifyError::AuthError(format!("Stripe webhook signature error: {}", msg))
            }
            StripeError::WebhookProcessingError(msg) => BookifyError::ExternalServiceError {
                service_name: "Stripe webhook".to_string(),
                message: msg,
            },
            StripeError::InternalError(msg) => BookifyError::InternalError(msg),
        }
    }
}

impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::Validation(_) => 422,
            StripeError::RequestError(_) => 500,
            StripeError::ApiError { .. } => 500,
            StripeError::ParseError(_) => 400,
            StripeError::ConfigError => 500,
            StripeError::SignatureError(_) => 400,
            StripeError::WebhookProcessingError(_) => 500,
            StripeError::InternalError(_) => 500,
        }
    }
}

impl IntoResponse for StripeError {
    fn into_response(self) -> Response {
        error_response(&self)
    }
}
