// --- File: crates/bookify_stripe/src/logic.rs ---
//! Stripe REST calls and webhook processing.
//!
//! Talks to the Stripe API directly over form-encoded HTTPS (no SDK):
//! Checkout Sessions for pay-at-booking, PaymentIntents for client-side
//! completion, and signed webhook events reporting payment outcomes, which
//! get mapped back onto bookings through their metadata.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info, warn};

use crate::error::StripeError;
use bookify_common::HTTP_CLIENT;
use bookify_config::StripeConfig;
use bookify_db::BookingRepository;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Currencies accepted for payment intents.
const ALLOWED_CURRENCIES: [&str; 2] = ["cad", "usd"];
const DEFAULT_INTENT_CURRENCY: &str = "cad";

/// Maximum accepted age of a webhook timestamp, per Stripe's guidance.
const SIGNATURE_TOLERANCE_SECONDS: i64 = 300;

// --- Data Structures ---

/// Parameters for opening a hosted Checkout Session tied to one booking.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    /// Amount in minor currency units (cents)
    pub amount: i64,
    pub currency: String,
    pub product_name: String,
    pub product_description: Option<String>,
    pub customer_email: String,
    pub booking_id: String,
}

#[derive(Serialize, Debug)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
}

/// Request from the frontend to create a PaymentIntent.
#[derive(Deserialize, Debug)]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor currency units (cents)
    pub amount: i64,
    pub currency: Option<String>,
    pub customer_name: Option<String>,
    pub booking_id: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug)]
struct StripeCheckoutSessionApiResponse {
    pub id: String,
    pub url: Option<String>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug)]
struct StripePaymentIntentApiResponse {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: Option<String>,
}

/// Represents the `data` field within a Stripe Event. The inner object's
/// shape varies by event type, so it stays a raw value until matched.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// The outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String, // e.g. "payment_intent.succeeded"
    pub data: StripeEventData,
    pub created: Option<i64>,
    pub livemode: Option<bool>,
}

/// `data.object` for payment_intent.* events, reduced to what we use.
#[derive(Deserialize, Debug, Clone)]
pub struct StripePaymentIntentObject {
    pub id: String,
    pub metadata: Option<HashMap<String, String>>,
}

/// `data.object` for checkout.session.* events, reduced to what we use.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeCheckoutSessionObject {
    pub id: String,
    pub payment_status: Option<String>, // "paid", "unpaid", "no_payment_required"
    pub metadata: Option<HashMap<String, String>>,
}

// --- Checkout Sessions ---

/// Creates a Stripe Checkout Session for a booking.
///
/// The booking id rides along in session metadata so webhook events can be
/// mapped back, and the session expires 30 minutes after creation (config
/// override) so abandoned checkouts release quickly.
pub async fn create_checkout_session(
    stripe_config: &StripeConfig,
    params: CheckoutSessionParams,
) -> Result<CheckoutSessionResponse, StripeError> {
    info!(
        "[Stripe] Creating Checkout Session for booking {}",
        params.booking_id
    );

    let stripe_secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| StripeError::ConfigError)?;

    let expires_at =
        (Utc::now() + Duration::minutes(stripe_config.session_expiry_minutes())).timestamp();

    let description = params
        .product_description
        .unwrap_or_else(|| "Service booking".to_string());

    let mut form_body: Vec<(String, String)> = vec![
        ("payment_method_types[]".to_string(), "card".to_string()),
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), stripe_config.success_url.clone()),
        ("cancel_url".to_string(), stripe_config.cancel_url.clone()),
        (
            "line_items[0][price_data][currency]".to_string(),
            params.currency.to_lowercase(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            params.product_name.clone(),
        ),
        (
            "line_items[0][price_data][product_data][description]".to_string(),
            description,
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            params.amount.to_string(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("customer_email".to_string(), params.customer_email),
        ("expires_at".to_string(), expires_at.to_string()),
        ("metadata[booking_id]".to_string(), params.booking_id),
    ];
    form_body.push(("metadata[service_name]".to_string(), params.product_name));

    let api_url = format!("{}/checkout/sessions", STRIPE_API_BASE);

    let response = HTTP_CLIENT
        .post(&api_url)
        .basic_auth(stripe_secret_key, None::<&str>)
        .form(&form_body)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        let session: StripeCheckoutSessionApiResponse = serde_json::from_str(&body_text)?;
        let url = session.url.ok_or_else(|| {
            StripeError::InternalError("Stripe response missing checkout URL".to_string())
        })?;
        info!("[Stripe] Checkout Session {} created", session.id);
        Ok(CheckoutSessionResponse {
            session_id: session.id,
            url,
        })
    } else {
        Err(api_error(status.as_u16(), &body_text))
    }
}

// --- Payment Intents ---

/// Creates a Stripe PaymentIntent and returns its client secret for
/// client-side completion.
pub async fn create_payment_intent(
    request: CreatePaymentIntentRequest,
) -> Result<PaymentIntentResponse, StripeError> {
    if request.amount <= 0 {
        return Err(StripeError::Validation(
            "amount must be a positive number of minor currency units".to_string(),
        ));
    }
    let currency = request
        .currency
        .as_deref()
        .unwrap_or(DEFAULT_INTENT_CURRENCY)
        .to_lowercase();
    if !ALLOWED_CURRENCIES.contains(&currency.as_str()) {
        return Err(StripeError::Validation(format!(
            "currency must be one of: {}",
            ALLOWED_CURRENCIES.join(", ")
        )));
    }

    let stripe_secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| StripeError::ConfigError)?;

    let mut form_body: Vec<(String, String)> = vec![
        ("amount".to_string(), request.amount.to_string()),
        ("currency".to_string(), currency),
        ("payment_method_types[]".to_string(), "card".to_string()),
    ];
    if let Some(customer_name) = request.customer_name {
        form_body.push(("metadata[customer_name]".to_string(), customer_name));
    }
    if let Some(booking_id) = request.booking_id {
        form_body.push(("metadata[booking_id]".to_string(), booking_id));
    }

    let api_url = format!("{}/payment_intents", STRIPE_API_BASE);

    let response = HTTP_CLIENT
        .post(&api_url)
        .basic_auth(stripe_secret_key, None::<&str>)
        .form(&form_body)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        let intent: StripePaymentIntentApiResponse = serde_json::from_str(&body_text)?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            StripeError::InternalError("Stripe response missing client secret".to_string())
        })?;
        info!("[Stripe] PaymentIntent {} created", intent.id);
        Ok(PaymentIntentResponse {
            client_secret,
            payment_intent_id: intent.id,
        })
    } else {
        Err(api_error(status.as_u16(), &body_text))
    }
}

/// Pulls the human-readable message out of a Stripe error body.
fn api_error(status_code: u16, body_text: &str) -> StripeError {
    let message = match serde_json::from_str::<serde_json::Value>(body_text) {
        Ok(json_body) => json_body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or(body_text)
            .to_string(),
        Err(_) => body_text.to_string(),
    };
    warn!("[Stripe] API request failed ({}): {}", status_code, message);
    StripeError::ApiError {
        status_code,
        message,
    }
}

// --- Webhook Verification ---

/// Verifies the `Stripe-Signature` header of an incoming webhook request.
///
/// The header carries a timestamp `t` and one or more `v1` signatures;
/// each `v1` is HMAC-SHA256 of `"{t}.{payload}"` under the endpoint
/// secret. Timestamps older than the tolerance window are rejected to
/// blunt replay.
pub fn verify_webhook_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::SignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();

    for item in sig_header_value.split(',') {
        if let Some((key, value)) = item.trim().split_once('=') {
            match key {
                "t" => timestamp_str = Some(value),
                "v1" => v1_signatures_hex.push(value),
                _ => {} // ignore v0 and unknown parts
            }
        }
    }

    let timestamp_str = timestamp_str.ok_or_else(|| {
        StripeError::SignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let parsed_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        StripeError::SignatureError("Invalid timestamp format in Stripe-Signature".to_string())
    })?;

    if v1_signatures_hex.is_empty() {
        return Err(StripeError::SignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    let current_timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    if (current_timestamp - parsed_timestamp).abs() > SIGNATURE_TOLERANCE_SECONDS {
        return Err(StripeError::SignatureError(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let signed_payload = format!(
        "{}.{}",
        timestamp_str,
        String::from_utf8_lossy(payload_bytes)
    );

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::SignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(signed_payload.as_bytes());
    let calculated_signature_hex = hex::encode(mac.finalize().into_bytes());

    for provided_sig_hex in v1_signatures_hex {
        if constant_time_eq(
            calculated_signature_hex.as_bytes(),
            provided_sig_hex.as_bytes(),
        ) {
            return Ok(());
        }
    }

    Err(StripeError::SignatureError("Signature mismatch".to_string()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// --- Webhook Processing ---

fn metadata_booking_id(metadata: Option<&HashMap<String, String>>) -> Option<String> {
    metadata.and_then(|m| m.get("booking_id").cloned())
}

/// Processes a verified Stripe webhook event, mapping payment outcomes onto
/// the booking named in the event's metadata.
///
/// Stripe redelivers events, so every branch must be idempotent: marking an
/// already-paid booking paid again is a successful no-op, and events we
/// cannot map are acknowledged rather than errored so the gateway does not
/// retry them forever.
pub async fn process_webhook(
    event: StripeEvent,
    bookings: &dyn BookingRepository,
) -> Result<(), StripeError> {
    info!("Processing Stripe event {} ({})", event.id, event.event_type);

    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let intent: StripePaymentIntentObject = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    StripeError::WebhookProcessingError(format!(
                        "Failed to parse payment intent object: {}",
                        e
                    ))
                })?;
            match metadata_booking_id(intent.metadata.as_ref()) {
                Some(booking_id) => mark_booking_paid(bookings, &booking_id, &intent.id).await?,
                None => warn!(
                    "payment_intent.succeeded {} carries no booking_id metadata",
                    intent.id
                ),
            }
        }
        "payment_intent.payment_failed" => {
            let intent: StripePaymentIntentObject = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    StripeError::WebhookProcessingError(format!(
                        "Failed to parse payment intent object: {}",
                        e
                    ))
                })?;
            // The booking stays unpaid; unpaid is the failed-payment state
            // and the customer can retry checkout.
            warn!(
                "Payment failed for intent {} (booking {:?})",
                intent.id,
                metadata_booking_id(intent.metadata.as_ref())
            );
        }
        "checkout.session.completed" => {
            let session: StripeCheckoutSessionObject = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    StripeError::WebhookProcessingError(format!(
                        "Failed to parse checkout session object: {}",
                        e
                    ))
                })?;
            if session.payment_status.as_deref() == Some("paid") {
                match metadata_booking_id(session.metadata.as_ref()) {
                    Some(booking_id) => {
                        mark_booking_paid(bookings, &booking_id, &session.id).await?
                    }
                    None => warn!(
                        "checkout.session.completed {} carries no booking_id metadata",
                        session.id
                    ),
                }
            } else {
                info!(
                    "Checkout session {} completed with payment status {:?}; nothing to do",
                    session.id, session.payment_status
                );
            }
        }
        other => {
            debug!("Ignoring unhandled Stripe event type: {}", other);
        }
    }
    Ok(())
}

async fn mark_booking_paid(
    bookings: &dyn BookingRepository,
    booking_id: &str,
    source: &str,
) -> Result<(), StripeError> {
    let updated = bookings
        .mark_paid(booking_id)
        .await
        .map_err(|e| StripeError::WebhookProcessingError(e.to_string()))?;
    if updated {
        info!("Booking {} marked paid via {}", booking_id, source);
    } else {
        // Acknowledged anyway: retrying cannot make an unknown id appear
        warn!(
            "Event {} references unknown booking {}; nothing updated",
            source, booking_id
        );
    }
    Ok(())
}
