// --- File: crates/bookify_stripe/src/lib.rs ---

pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_test;
pub mod routes;
pub mod service;

// Re-export for the main backend
pub use error::StripeError;
pub use handlers::StripeState;
pub use routes::routes;
pub use service::StripePaymentService;
