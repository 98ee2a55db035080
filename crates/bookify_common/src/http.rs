// --- File: crates/bookify_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::error::{BookifyError, HttpStatusCode};

/// Default timeout for outbound HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A static HTTP client reused across the application for gateway calls.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
});

/// Builds the standard error envelope: `{"success": false, "message": ...}`
/// with the status code from the error's `HttpStatusCode` impl.
pub fn error_response<E>(err: &E) -> Response
where
    E: HttpStatusCode + std::fmt::Display,
{
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Json(json!({
        "success": false,
        "message": err.to_string(),
    }));
    (status, body).into_response()
}

impl IntoResponse for BookifyError {
    fn into_response(self) -> Response {
        error_response(&self)
    }
}
