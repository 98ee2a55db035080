// --- File: crates/bookify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! These traits decouple booking logic from the concrete payment gateway so
//! handlers can hold a trait object and tests can substitute a double.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for
/// Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Everything the gateway needs to open a hosted checkout for one booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Amount in minor currency units (cents)
    pub amount: i64,
    pub currency: String,
    pub product_name: String,
    pub product_description: Option<String>,
    pub customer_email: String,
    /// Our booking id, round-tripped through gateway metadata so webhook
    /// events can be mapped back to the booking.
    pub booking_id: String,
}

/// A created hosted-checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    /// Where to redirect the customer to complete payment
    pub url: String,
}

/// A created payment intent, completed client-side via the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

/// A trait for payment gateway operations.
///
/// Single-attempt semantics: implementations must not retry session or
/// intent creation (duplicate-charge hazard).
pub trait PaymentService: Send + Sync {
    /// Error type returned by payment service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a hosted checkout session for a booking.
    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, Self::Error>;

    /// Create a payment intent for client-side completion.
    fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        customer_name: Option<&str>,
        booking_id: Option<&str>,
    ) -> BoxFuture<'_, PaymentIntent, Self::Error>;
}
