// --- File: crates/bookify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities and shared client
pub mod logging; // Logging utilities
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{BookifyError, HttpStatusCode};

// Re-export HTTP utilities for easier access
pub use http::{error_response, HTTP_CLIENT};

// Re-export service abstractions
pub use services::{
    BoxFuture, BoxedError, CheckoutRequest, CheckoutSession, PaymentIntent, PaymentService,
};
