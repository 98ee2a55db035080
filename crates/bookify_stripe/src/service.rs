// --- File: crates/bookify_stripe/src/service.rs ---
//! `PaymentService` implementation backed by the Stripe REST logic.

use crate::error::StripeError;
use crate::logic::{
    create_checkout_session, create_payment_intent, CheckoutSessionParams,
    CreatePaymentIntentRequest,
};
use bookify_common::services::{
    BoxFuture, BoxedError, CheckoutRequest, CheckoutSession, PaymentIntent, PaymentService,
};
use bookify_config::AppConfig;
use std::sync::Arc;

/// Stripe payment service implementation
pub struct StripePaymentService {
    config: Arc<AppConfig>,
}

impl StripePaymentService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

fn boxed(err: StripeError) -> BoxedError {
    BoxedError(Box::new(err))
}

impl PaymentService for StripePaymentService {
    type Error = BoxedError;

    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, Self::Error> {
        Box::pin(async move {
            let stripe_config = self
                .config
                .stripe
                .as_ref()
                .ok_or_else(|| boxed(StripeError::ConfigError))?;

            let params = CheckoutSessionParams {
                amount: request.amount,
                currency: request.currency,
                product_name: request.product_name,
                product_description: request.product_description,
                customer_email: request.customer_email,
                booking_id: request.booking_id,
            };

            let session = create_checkout_session(stripe_config, params)
                .await
                .map_err(boxed)?;

            Ok(CheckoutSession {
                session_id: session.session_id,
                url: session.url,
            })
        })
    }

    fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        customer_name: Option<&str>,
        booking_id: Option<&str>,
    ) -> BoxFuture<'_, PaymentIntent, Self::Error> {
        let currency = currency.to_string();
        let customer_name = customer_name.map(|s| s.to_string());
        let booking_id = booking_id.map(|s| s.to_string());

        Box::pin(async move {
            let request = CreatePaymentIntentRequest {
                amount,
                currency: Some(currency.clone()),
                customer_name,
                booking_id,
            };

            let intent = create_payment_intent(request).await.map_err(boxed)?;

            Ok(PaymentIntent {
                id: intent.payment_intent_id,
                client_secret: intent.client_secret,
                amount,
                currency,
            })
        })
    }
}
