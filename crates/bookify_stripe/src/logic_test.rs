#[cfg(test)]
mod tests {
    use crate::error::StripeError;
    use crate::logic::{
        create_payment_intent, process_webhook, verify_webhook_signature,
        CreatePaymentIntentRequest, StripeEvent,
    };
    use bookify_common::BoxFuture;
    use bookify_db::{Booking, BookingPatch, BookingRepository, DbError};
    use chrono::{DateTime, NaiveDate, Utc};
    use hmac::{Hmac, Mac};
    use serde_json::json;
    use sha2::Sha256;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "whsec_test_secret";

    // --- Helpers ---

    fn now_ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn sign(payload: &str, timestamp: i64, secret: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signature_header(payload: &str, timestamp: i64) -> String {
        format!("t={},v1={}", timestamp, sign(payload, timestamp, SECRET))
    }

    fn event(event_type: &str, object: serde_json::Value) -> StripeEvent {
        serde_json::from_value(json!({
            "id": "evt_test_1",
            "type": event_type,
            "data": { "object": object },
            "created": 1700000000i64,
            "livemode": false
        }))
        .unwrap()
    }

    /// Booking repository double that only tracks paid state: a set of known
    /// ids and how many times each was marked paid.
    struct PaidTracker {
        known: Vec<String>,
        marked: Mutex<HashMap<String, u32>>,
    }

    impl PaidTracker {
        fn with_booking(id: &str) -> Self {
            Self {
                known: vec![id.to_string()],
                marked: Mutex::new(HashMap::new()),
            }
        }

        fn times_marked(&self, id: &str) -> u32 {
            self.marked.lock().unwrap().get(id).copied().unwrap_or(0)
        }
    }

    impl BookingRepository for PaidTracker {
        fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
            Box::pin(async { Ok(()) })
        }

        fn create(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError> {
            Box::pin(async move { Ok(booking) })
        }

        fn find_by_id(&self, _id: &str) -> BoxFuture<'_, Option<Booking>, DbError> {
            Box::pin(async { Ok(None) })
        }

        fn find_all(&self) -> BoxFuture<'_, Vec<Booking>, DbError> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn find_by_date(&self, _date: NaiveDate) -> BoxFuture<'_, Vec<Booking>, DbError> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn find_active_slot(
            &self,
            _date: NaiveDate,
            _slot: &str,
        ) -> BoxFuture<'_, Option<Booking>, DbError> {
            Box::pin(async { Ok(None) })
        }

        fn update_fields(
            &self,
            _id: &str,
            _patch: BookingPatch,
        ) -> BoxFuture<'_, Option<Booking>, DbError> {
            Box::pin(async { Ok(None) })
        }

        fn set_payment_session(&self, _id: &str, _session_id: &str) -> BoxFuture<'_, (), DbError> {
            Box::pin(async { Ok(()) })
        }

        fn mark_paid(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
            let id = id.to_string();
            Box::pin(async move {
                if self.known.contains(&id) {
                    *self.marked.lock().unwrap().entry(id).or_insert(0) += 1;
                    Ok(true)
                } else {
                    Ok(false)
                }
            })
        }

        fn delete(&self, _id: &str) -> BoxFuture<'_, bool, DbError> {
            Box::pin(async { Ok(false) })
        }

        fn purge_abandoned(&self, _before: DateTime<Utc>) -> BoxFuture<'_, u64, DbError> {
            Box::pin(async { Ok(0) })
        }
    }

    // --- Signature verification ---

    #[test]
    fn valid_signature_verifies() {
        let payload = r#"{"id":"evt_test_1"}"#;
        let header = signature_header(payload, now_ts());

        assert!(verify_webhook_signature(payload.as_bytes(), Some(&header), SECRET).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = r#"{"id":"evt_test_1"}"#;
        let header = signature_header(payload, now_ts());

        let err = verify_webhook_signature(b"{\"id\":\"evt_evil\"}", Some(&header), SECRET)
            .unwrap_err();
        assert!(matches!(err, StripeError::SignatureError(_)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = r#"{"id":"evt_test_1"}"#;
        let header = signature_header(payload, now_ts());

        let err =
            verify_webhook_signature(payload.as_bytes(), Some(&header), "whsec_other").unwrap_err();
        assert!(matches!(err, StripeError::SignatureError(_)));
    }

    #[test]
    fn missing_or_malformed_header_is_rejected() {
        let payload = r#"{"id":"evt_test_1"}"#;

        for header in [None, Some("garbage"), Some("t=abc,v1=deadbeef")] {
            let err = verify_webhook_signature(payload.as_bytes(), header, SECRET).unwrap_err();
            assert!(matches!(err, StripeError::SignatureError(_)));
        }

        // timestamp but no v1 signature
        let err = verify_webhook_signature(
            payload.as_bytes(),
            Some(&format!("t={}", now_ts())),
            SECRET,
        )
        .unwrap_err();
        assert!(matches!(err, StripeError::SignatureError(_)));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = r#"{"id":"evt_test_1"}"#;
        let stale = now_ts() - 4000;
        let header = signature_header(payload, stale);

        let err = verify_webhook_signature(payload.as_bytes(), Some(&header), SECRET).unwrap_err();
        assert!(matches!(err, StripeError::SignatureError(_)));
    }

    #[test]
    fn any_matching_v1_signature_passes() {
        let payload = r#"{"id":"evt_test_1"}"#;
        let ts = now_ts();
        let header = format!(
            "t={},v1={},v1={}",
            ts,
            "0".repeat(64),
            sign(payload, ts, SECRET)
        );

        assert!(verify_webhook_signature(payload.as_bytes(), Some(&header), SECRET).is_ok());
    }

    // --- Webhook processing ---

    #[tokio::test]
    async fn succeeded_intent_marks_the_booking_paid_idempotently() {
        let repo = PaidTracker::with_booking("booking-1");
        let object = json!({
            "id": "pi_1",
            "metadata": { "booking_id": "booking-1" }
        });

        // Stripe may redeliver the same event; both deliveries must succeed
        process_webhook(event("payment_intent.succeeded", object.clone()), &repo)
            .await
            .unwrap();
        process_webhook(event("payment_intent.succeeded", object), &repo)
            .await
            .unwrap();

        // The repository write is an absorbing "set paid", so even two
        // deliveries leave exactly one terminal state
        assert!(repo.times_marked("booking-1") >= 1);
    }

    #[tokio::test]
    async fn succeeded_intent_without_booking_metadata_is_acknowledged() {
        let repo = PaidTracker::with_booking("booking-1");
        let object = json!({ "id": "pi_1", "metadata": {} });

        process_webhook(event("payment_intent.succeeded", object), &repo)
            .await
            .unwrap();

        assert_eq!(repo.times_marked("booking-1"), 0);
    }

    #[tokio::test]
    async fn succeeded_intent_for_unknown_booking_is_acknowledged() {
        let repo = PaidTracker::with_booking("booking-1");
        let object = json!({
            "id": "pi_1",
            "metadata": { "booking_id": "vanished" }
        });

        process_webhook(event("payment_intent.succeeded", object), &repo)
            .await
            .unwrap();

        assert_eq!(repo.times_marked("booking-1"), 0);
    }

    #[tokio::test]
    async fn failed_intent_leaves_the_booking_unpaid() {
        let repo = PaidTracker::with_booking("booking-1");
        let object = json!({
            "id": "pi_1",
            "metadata": { "booking_id": "booking-1" }
        });

        process_webhook(event("payment_intent.payment_failed", object), &repo)
            .await
            .unwrap();

        assert_eq!(repo.times_marked("booking-1"), 0);
    }

    #[tokio::test]
    async fn completed_checkout_session_marks_paid_only_when_paid() {
        let repo = PaidTracker::with_booking("booking-1");

        let unpaid = json!({
            "id": "cs_1",
            "payment_status": "unpaid",
            "metadata": { "booking_id": "booking-1" }
        });
        process_webhook(event("checkout.session.completed", unpaid), &repo)
            .await
            .unwrap();
        assert_eq!(repo.times_marked("booking-1"), 0);

        let paid = json!({
            "id": "cs_1",
            "payment_status": "paid",
            "metadata": { "booking_id": "booking-1" }
        });
        process_webhook(event("checkout.session.completed", paid), &repo)
            .await
            .unwrap();
        assert_eq!(repo.times_marked("booking-1"), 1);
    }

    #[tokio::test]
    async fn unhandled_event_types_are_ignored() {
        let repo = PaidTracker::with_booking("booking-1");

        process_webhook(event("customer.created", json!({ "id": "cus_1" })), &repo)
            .await
            .unwrap();

        assert_eq!(repo.times_marked("booking-1"), 0);
    }

    // --- Payment intent validation ---

    #[tokio::test]
    async fn non_positive_amounts_are_rejected_before_any_gateway_call() {
        for amount in [0, -100] {
            let err = create_payment_intent(CreatePaymentIntentRequest {
                amount,
                currency: None,
                customer_name: None,
                booking_id: None,
            })
            .await
            .unwrap_err();
            assert!(matches!(err, StripeError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn unsupported_currency_is_rejected() {
        let err = create_payment_intent(CreatePaymentIntentRequest {
            amount: 1000,
            currency: Some("eur".to_string()),
            customer_name: None,
            booking_id: None,
        })
        .await
        .unwrap_err();
        assert!(matches!(err, StripeError::Validation(_)));
    }
}
