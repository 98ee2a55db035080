#[cfg(test)]
mod tests {
    use crate::error::BookingError;
    use crate::logic::{
        available_slots, create_booking, create_service, delete_booking, get_booking,
        parse_appointment_time, update_booking, update_service, CreateBookingRequest,
        CreateServiceRequest, UpdateBookingRequest, UpdateServiceRequest,
    };
    use crate::testing::{FailingPayments, InMemoryBookings, InMemoryServices, OkPayments};
    use bookify_config::{AppConfig, BookingConfig, ServerConfig, StripeConfig};
    use bookify_db::{Booking, BookingStatus, DbError, PaymentStatus};
    use chrono::{DateTime, Duration, Utc};

    // --- Helpers ---

    fn test_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            use_stripe: true,
            database: None,
            stripe: Some(StripeConfig {
                success_url: "https://example.com/success".to_string(),
                cancel_url: "https://example.com/cancel".to_string(),
                default_currency: Some("usd".to_string()),
                session_expiry_minutes: None,
            }),
            booking: BookingConfig::default(),
        }
    }

    /// A timestamp `days` from now, pinned to the given slot time.
    fn future_time(days: i64, slot: &str) -> String {
        let date = (Utc::now() + Duration::days(days)).date_naive();
        format!("{}T{}:00Z", date.format("%Y-%m-%d"), slot)
    }

    fn booking_request(time: &str) -> CreateBookingRequest {
        CreateBookingRequest {
            customer_name: "Alice Doe".to_string(),
            phone_number: "555-0100".to_string(),
            appointment_time: time.to_string(),
            email: None,
            pay_now: false,
            service_id: None,
        }
    }

    fn stored_booking(id: &str, time: DateTime<Utc>, status: BookingStatus) -> Booking {
        Booking {
            id: id.to_string(),
            customer_name: "Bob".to_string(),
            phone_number: "555-0101".to_string(),
            email: None,
            service_id: None,
            appointment_time: time,
            status,
            payment_status: PaymentStatus::Unpaid,
            payment_session_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn utc(date: &str, slot: &str) -> DateTime<Utc> {
        format!("{}T{}:00Z", date, slot).parse().unwrap()
    }

    async fn seed_service(services: &InMemoryServices) -> String {
        let created = create_service(
            services,
            CreateServiceRequest {
                name: "Haircut".to_string(),
                description: Some("Classic cut".to_string()),
                price: 4500,
            },
        )
        .await
        .unwrap();
        created.id
    }

    // --- Slot availability ---

    #[tokio::test]
    async fn empty_date_returns_full_universe() {
        let repo = InMemoryBookings::default();
        let cfg = BookingConfig::default();

        let result = available_slots(&repo, &cfg, "2025-03-10").await.unwrap();

        assert_eq!(result.available_slots, cfg.slots);
        assert!(result.booked_slots.is_empty());
        assert_eq!(result.total_slots, 7);
        assert_eq!(result.available_count, 7);
    }

    #[tokio::test]
    async fn booked_slot_is_subtracted_in_universe_order() {
        let repo = InMemoryBookings::default();
        repo.insert(stored_booking(
            "b1",
            utc("2025-03-10", "11:00"),
            BookingStatus::Confirmed,
        ));

        let result = available_slots(&repo, &BookingConfig::default(), "2025-03-10")
            .await
            .unwrap();

        assert_eq!(
            result.available_slots,
            vec!["09:00", "10:00", "12:00", "14:00", "15:00", "16:00"]
        );
        assert_eq!(result.booked_slots, vec!["11:00"]);
        assert_eq!(result.total_slots, 7);
        assert_eq!(result.available_count, 6);
    }

    #[tokio::test]
    async fn cancelled_bookings_do_not_occupy_slots() {
        let repo = InMemoryBookings::default();
        repo.insert(stored_booking(
            "b1",
            utc("2025-03-10", "11:00"),
            BookingStatus::Cancelled,
        ));

        let result = available_slots(&repo, &BookingConfig::default(), "2025-03-10")
            .await
            .unwrap();

        assert!(result.booked_slots.is_empty());
        assert_eq!(result.available_count, 7);
    }

    #[tokio::test]
    async fn other_dates_do_not_leak_into_availability() {
        let repo = InMemoryBookings::default();
        repo.insert(stored_booking(
            "b1",
            utc("2025-03-11", "11:00"),
            BookingStatus::Confirmed,
        ));

        let result = available_slots(&repo, &BookingConfig::default(), "2025-03-10")
            .await
            .unwrap();

        assert_eq!(result.available_count, 7);
    }

    #[tokio::test]
    async fn malformed_date_is_rejected() {
        let repo = InMemoryBookings::default();
        let cfg = BookingConfig::default();

        for bad in ["not-a-date", "2025-13-40", "10.03.2025", ""] {
            let err = available_slots(&repo, &cfg, bad).await.unwrap_err();
            assert!(matches!(err, BookingError::Validation { .. }), "{}", bad);
        }
    }

    // --- Booking creation ---

    #[tokio::test]
    async fn create_persists_with_pending_unpaid_defaults() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();
        let time = future_time(7, "10:00");

        let created =
            create_booking(&repo, &services, None, &test_config(), booking_request(&time))
                .await
                .unwrap();

        assert!(created.payment_url.is_none());
        let fetched = get_booking(&repo, &created.booking.id).await.unwrap();
        assert_eq!(fetched.customer_name, "Alice Doe");
        assert_eq!(fetched.phone_number, "555-0100");
        assert_eq!(fetched.status, BookingStatus::Pending);
        assert_eq!(fetched.payment_status, PaymentStatus::Unpaid);
        assert_eq!(fetched.appointment_slot(), "10:00");
    }

    #[tokio::test]
    async fn past_appointment_time_is_rejected_without_side_effects() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();

        let err = create_booking(
            &repo,
            &services,
            None,
            &test_config(),
            booking_request("2020-01-06T10:00:00Z"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::Validation { .. }));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn field_validation_rejects_bad_input() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();
        let cfg = test_config();
        let time = future_time(7, "10:00");

        let mut empty_name = booking_request(&time);
        empty_name.customer_name = "   ".to_string();

        let mut long_phone = booking_request(&time);
        long_phone.phone_number = "0".repeat(21);

        let mut bad_email = booking_request(&time);
        bad_email.email = Some("not-an-email".to_string());

        // 10:30 is between slots and therefore never bookable
        let off_schedule = booking_request(&future_time(7, "10:30"));

        for request in [empty_name, long_phone, bad_email, off_schedule] {
            let err = create_booking(&repo, &services, None, &cfg, request)
                .await
                .unwrap_err();
            assert!(matches!(err, BookingError::Validation { .. }));
        }
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn conflicting_slot_is_rejected_until_cancelled() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();
        let cfg = test_config();
        let time = future_time(7, "11:00");

        let first = create_booking(&repo, &services, None, &cfg, booking_request(&time))
            .await
            .unwrap();

        let err = create_booking(&repo, &services, None, &cfg, booking_request(&time))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SlotConflict));

        // Cancelling frees the slot; the retried request succeeds
        update_booking(
            &repo,
            &first.booking.id,
            UpdateBookingRequest {
                status: Some("cancelled".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let retried = create_booking(&repo, &services, None, &cfg, booking_request(&time)).await;
        assert!(retried.is_ok());
    }

    #[test]
    fn unique_violation_from_the_store_maps_to_slot_conflict() {
        // What a request racing past the read-side check experiences when
        // the insert loses at the constraint
        let err: BookingError =
            DbError::UniqueViolation("ux_bookings_active_slot".to_string()).into();
        assert!(matches!(err, BookingError::SlotConflict));
    }

    // --- Payment at booking time ---

    #[tokio::test]
    async fn pay_now_returns_checkout_redirect_and_stores_session() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();
        let service_id = seed_service(&services).await;
        let cfg = test_config();

        let mut request = booking_request(&future_time(7, "14:00"));
        request.email = Some("alice@example.com".to_string());
        request.pay_now = true;
        request.service_id = Some(service_id);

        let created = create_booking(&repo, &services, Some(&OkPayments), &cfg, request)
            .await
            .unwrap();

        let url = created.payment_url.expect("expected a redirect URL");
        assert!(url.starts_with("https://checkout.example/"));
        let stored = repo.get(&created.booking.id).unwrap();
        assert_eq!(
            stored.payment_session_id.as_deref(),
            Some(format!("cs_test_{}", created.booking.id).as_str())
        );
        assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn gateway_failure_keeps_booking_persisted_and_unpaid() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();
        let service_id = seed_service(&services).await;

        let mut request = booking_request(&future_time(7, "15:00"));
        request.email = Some("alice@example.com".to_string());
        request.pay_now = true;
        request.service_id = Some(service_id);

        let err = create_booking(
            &repo,
            &services,
            Some(&FailingPayments),
            &test_config(),
            request,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::Payment(_)));
        assert_eq!(repo.len(), 1);
        let stored = repo.rows.lock().unwrap().values().next().cloned().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
        assert!(stored.payment_session_id.is_none());
    }

    #[tokio::test]
    async fn pay_now_without_email_skips_the_payment_step() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();

        let mut request = booking_request(&future_time(7, "16:00"));
        request.pay_now = true; // no email

        // FailingPayments proves the gateway is never called
        let created = create_booking(
            &repo,
            &services,
            Some(&FailingPayments),
            &test_config(),
            request,
        )
        .await
        .unwrap();

        assert!(created.payment_url.is_none());
    }

    #[tokio::test]
    async fn pay_now_with_unknown_service_fails_before_persisting() {
        let repo = InMemoryBookings::default();
        let services = InMemoryServices::default();

        let mut request = booking_request(&future_time(7, "09:00"));
        request.email = Some("alice@example.com".to_string());
        request.pay_now = true;
        request.service_id = Some("nope".to_string());

        let err = create_booking(&repo, &services, Some(&OkPayments), &test_config(), request)
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Validation { .. }));
        assert_eq!(repo.len(), 0);
    }

    // --- Update / delete ---

    #[tokio::test]
    async fn update_unknown_id_is_not_found_and_creates_nothing() {
        let repo = InMemoryBookings::default();

        let err = update_booking(
            &repo,
            "missing",
            UpdateBookingRequest {
                customer_name: Some("Mallory".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::NotFound(_)));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn update_patches_only_the_given_fields() {
        let repo = InMemoryBookings::default();
        repo.insert(stored_booking(
            "b1",
            utc("2030-06-03", "09:00"),
            BookingStatus::Pending,
        ));

        let updated = update_booking(
            &repo,
            "b1",
            UpdateBookingRequest {
                phone_number: Some("555-9999".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.phone_number, "555-9999");
        assert_eq!(updated.customer_name, "Bob");
        assert_eq!(updated.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn update_rejects_invalid_enum_values_and_past_times() {
        let repo = InMemoryBookings::default();
        repo.insert(stored_booking(
            "b1",
            utc("2030-06-03", "09:00"),
            BookingStatus::Pending,
        ));

        let bad_status = update_booking(
            &repo,
            "b1",
            UpdateBookingRequest {
                status: Some("archived".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(bad_status, BookingError::Validation { .. }));

        let past_time = update_booking(
            &repo,
            "b1",
            UpdateBookingRequest {
                appointment_time: Some("2020-01-01T09:00:00Z".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(past_time, BookingError::Validation { .. }));
    }

    #[tokio::test]
    async fn delete_removes_the_booking_and_missing_id_is_not_found() {
        let repo = InMemoryBookings::default();
        repo.insert(stored_booking(
            "b1",
            utc("2030-06-03", "09:00"),
            BookingStatus::Pending,
        ));

        delete_booking(&repo, "b1").await.unwrap();
        assert_eq!(repo.len(), 0);

        let err = delete_booking(&repo, "b1").await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    // --- Timestamp parsing ---

    #[test]
    fn naive_timestamps_are_accepted_as_utc() {
        let a = parse_appointment_time("2025-03-10 11:00:00").unwrap();
        let b = parse_appointment_time("2025-03-10T11:00:00Z").unwrap();
        assert_eq!(a, b);

        assert!(parse_appointment_time("soon").is_err());
        assert!(parse_appointment_time("2025-03-10").is_err());
    }

    // --- Service catalog ---

    #[tokio::test]
    async fn service_price_must_not_be_negative() {
        let services = InMemoryServices::default();

        let err = create_service(
            &services,
            CreateServiceRequest {
                name: "Haircut".to_string(),
                description: None,
                price: -1,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::Validation { .. }));
    }

    #[tokio::test]
    async fn service_update_patches_and_missing_id_is_not_found() {
        let services = InMemoryServices::default();
        let id = seed_service(&services).await;

        let updated = update_service(
            &services,
            &id,
            UpdateServiceRequest {
                price: Some(5500),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 5500);
        assert_eq!(updated.name, "Haircut");

        let err = update_service(&services, "missing", UpdateServiceRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }
}
