// --- File: crates/bookify_stripe/src/routes.rs ---

use crate::handlers::{create_payment_intent_handler, stripe_webhook_handler, StripeState};
use axum::{routing::post, Router};
use std::sync::Arc;

/// Creates a router containing all routes for the Stripe feature.
pub fn routes(state: Arc<StripeState>) -> Router {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent_handler))
        .route("/stripe-webhook", post(stripe_webhook_handler))
        .with_state(state)
}
