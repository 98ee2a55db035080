// --- File: crates/bookify_stripe/src/handlers.rs ---
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::StripeError;
use crate::logic::{
    create_payment_intent, process_webhook, verify_webhook_signature, CreatePaymentIntentRequest,
    PaymentIntentResponse, StripeEvent,
};
use bookify_common::error_response;
use bookify_config::AppConfig;
use bookify_db::BookingRepository;

// --- State for Stripe Handlers ---
#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<AppConfig>,
    /// Webhook events mutate booking payment state through this port
    pub bookings: Arc<dyn BookingRepository>,
}

#[derive(Serialize, Debug)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// Axum handler to create a Stripe PaymentIntent.
#[axum::debug_handler]
pub async fn create_payment_intent_handler(
    State(state): State<Arc<StripeState>>,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, StripeError> {
    if !state.config.use_stripe {
        return Err(StripeError::ConfigError);
    }

    let response = create_payment_intent(payload).await?;
    Ok(Json(response))
}

/// Axum handler for Stripe's server-to-server webhook notifications.
///
/// The body must stay raw for signature verification; the event is only
/// deserialized after the signature checks out.
#[axum::debug_handler]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !state.config.use_stripe {
        return error_response(&StripeError::ConfigError);
    }

    let webhook_secret = match std::env::var("STRIPE_WEBHOOK_SECRET") {
        Ok(s) => s,
        Err(_) => {
            error!("STRIPE_WEBHOOK_SECRET environment variable not set");
            return error_response(&StripeError::ConfigError);
        }
    };

    let sig_header = headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok());

    if let Err(e) = verify_webhook_signature(body.as_bytes(), sig_header, &webhook_secret) {
        warn!("Stripe webhook signature verification failed: {}", e);
        return error_response(&e);
    }

    let event: StripeEvent = match serde_json::from_str(&body) {
        Ok(ev) => ev,
        Err(e) => {
            warn!("Failed to deserialize Stripe webhook event: {}", e);
            return error_response(&StripeError::ParseError(e));
        }
    };

    match process_webhook(event, state.bookings.as_ref()).await {
        Ok(()) => {
            info!("Stripe webhook processed successfully");
            (StatusCode::OK, Json(WebhookAck { status: "success" })).into_response()
        }
        Err(e) => {
            error!("Error processing Stripe webhook: {}", e);
            error_response(&e)
        }
    }
}
