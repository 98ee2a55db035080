#[cfg(test)]
mod tests {
    use crate::handlers::BookingState;
    use crate::routes::routes;
    use crate::testing::{InMemoryBookings, InMemoryServices};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use bookify_config::{AppConfig, BookingConfig, ServerConfig};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> Arc<BookingState> {
        Arc::new(BookingState {
            config: Arc::new(AppConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 8080,
                },
                use_stripe: false,
                database: None,
                stripe: None,
                booking: BookingConfig::default(),
            }),
            bookings: Arc::new(InMemoryBookings::default()),
            services: Arc::new(InMemoryServices::default()),
            payments: None,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn available_slots_endpoint_returns_the_universe() {
        let app = routes(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/available-slots?date=2025-03-10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["date"], "2025-03-10");
        assert_eq!(json["available_slots"].as_array().unwrap().len(), 7);
        assert_eq!(json["available_count"], 7);
    }

    #[tokio::test]
    async fn malformed_date_is_a_422_with_error_envelope() {
        let app = routes(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/available-slots?date=whenever")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn unknown_booking_id_is_a_404() {
        let app = routes(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/bookings/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn past_booking_request_is_rejected_via_http() {
        let app = routes(test_state());

        let payload = serde_json::json!({
            "customer_name": "Alice Doe",
            "phone_number": "555-0100",
            "appointment_time": "2020-01-06T10:00:00Z"
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/bookings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn booking_created_over_http_returns_201_and_the_record() {
        let app = routes(test_state());

        let date = (chrono::Utc::now() + chrono::Duration::days(7))
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
        let payload = serde_json::json!({
            "customer_name": "Alice Doe",
            "phone_number": "555-0100",
            "appointment_time": format!("{}T10:00:00Z", date)
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/bookings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["booking"]["status"], "pending");
        assert_eq!(json["booking"]["payment_status"], "unpaid");
        assert!(json.get("payment_url").is_none());
    }

    #[tokio::test]
    async fn deleting_a_missing_service_is_a_404() {
        let app = routes(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/services/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
