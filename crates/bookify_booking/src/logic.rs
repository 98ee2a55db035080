// --- File: crates/bookify_booking/src/logic.rs ---
//! Slot availability and booking lifecycle.
//!
//! All input validation lives here as explicit functions returning
//! field-level errors; handlers only translate between HTTP and these
//! operations. Persistence and the payment gateway come in as ports.

use crate::error::BookingError;
use bookify_common::services::{BoxedError, CheckoutRequest, PaymentService};
use bookify_config::{AppConfig, BookingConfig};
use bookify_db::{
    Booking, BookingPatch, BookingRepository, BookingStatus, PaymentStatus, ServicePatch,
    ServiceRecord, ServiceRepository,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 255;
const MAX_PHONE_LEN: usize = 20;

// --- Data Structures ---

#[derive(Deserialize, Debug)]
pub struct AvailabilityQuery {
    /// Date in YYYY-MM-DD format
    pub date: String,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct SlotAvailability {
    pub success: bool,
    pub date: String,
    pub available_slots: Vec<String>,
    pub booked_slots: Vec<String>,
    pub total_slots: usize,
    pub available_count: usize,
}

#[derive(Deserialize, Debug)]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub phone_number: String,
    /// RFC 3339 ("2025-03-10T11:00:00Z") or naive "2025-03-10 11:00:00",
    /// treated as UTC
    pub appointment_time: String,
    pub email: Option<String>,
    #[serde(default)]
    pub pay_now: bool,
    pub service_id: Option<String>,
}

/// A created booking plus, when a checkout was opened, the redirect URL.
#[derive(Debug)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub payment_url: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateBookingRequest {
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub appointment_time: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units (cents)
    pub price: i64,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

// --- Validation ---

fn validate_text(field: &'static str, value: &str, max_len: usize) -> Result<String, BookingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(BookingError::validation(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_email(raw: &str) -> Result<String, BookingError> {
    let trimmed = raw.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !trimmed.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(BookingError::validation(
            "email",
            "must be a valid email address",
        ))
    }
}

/// Parses an appointment timestamp. RFC 3339 is preferred; naive
/// "YYYY-MM-DD HH:MM[:SS]" forms are accepted and treated as UTC.
pub fn parse_appointment_time(raw: &str) -> Result<DateTime<Utc>, BookingError> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(BookingError::validation(
        "appointment_time",
        "must be a valid timestamp",
    ))
}

fn validate_appointment_time(
    raw: &str,
    config: &BookingConfig,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, BookingError> {
    let parsed = parse_appointment_time(raw)?;
    if parsed <= now {
        return Err(BookingError::validation(
            "appointment_time",
            "must be in the future",
        ));
    }
    let slot = parsed.format("%H:%M").to_string();
    if !config.slots.contains(&slot) {
        return Err(BookingError::validation(
            "appointment_time",
            "must fall on one of the bookable time slots",
        ));
    }
    Ok(parsed)
}

// --- Slot Availability ---

/// Computes the bookable slots for a calendar date: the configured slot
/// universe minus the slots held by non-cancelled bookings, universe order
/// preserved. Read-only.
pub async fn available_slots(
    bookings: &dyn BookingRepository,
    config: &BookingConfig,
    date_str: &str,
) -> Result<SlotAvailability, BookingError> {
    let date = chrono::NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        BookingError::validation("date", "must be a valid date in YYYY-MM-DD format")
    })?;

    let booked_slots: Vec<String> = bookings
        .find_by_date(date)
        .await?
        .iter()
        .filter(|b| b.occupies_slot())
        .map(Booking::appointment_slot)
        .collect();

    let available: Vec<String> = config
        .slots
        .iter()
        .filter(|slot| !booked_slots.contains(slot))
        .cloned()
        .collect();

    Ok(SlotAvailability {
        success: true,
        date: date.format("%Y-%m-%d").to_string(),
        available_count: available.len(),
        total_slots: config.slots.len(),
        available_slots: available,
        booked_slots,
    })
}

// --- Booking Lifecycle ---

/// Creates a booking when its slot is free, optionally opening a hosted
/// checkout session for the referenced service.
///
/// The read-side conflict check gives a clean error message; the active-slot
/// unique index backs it up against a concurrent insert, which also surfaces
/// as `SlotConflict`. When checkout setup fails the booking stays persisted
/// and unpaid and the gateway error is returned to the caller.
pub async fn create_booking(
    bookings: &dyn BookingRepository,
    services: &dyn ServiceRepository,
    payments: Option<&dyn PaymentService<Error = BoxedError>>,
    config: &AppConfig,
    request: CreateBookingRequest,
) -> Result<CreatedBooking, BookingError> {
    let now = Utc::now();
    let customer_name = validate_text("customer_name", &request.customer_name, MAX_NAME_LEN)?;
    let phone_number = validate_text("phone_number", &request.phone_number, MAX_PHONE_LEN)?;
    let email = request
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(validate_email)
        .transpose()?;
    let appointment_time = validate_appointment_time(&request.appointment_time, &config.booking, now)?;

    let wants_payment = request.pay_now && email.is_some();

    // Resolve the service before anything is persisted, so a bad reference
    // fails as validation rather than stranding a booking mid-flow.
    let service = if wants_payment {
        let service_id = request.service_id.as_deref().ok_or_else(|| {
            BookingError::validation("service_id", "is required when paying at booking time")
        })?;
        let service = services.find_by_id(service_id).await?.ok_or_else(|| {
            BookingError::validation("service_id", "must reference an existing service")
        })?;
        Some(service)
    } else {
        None
    };

    let date = appointment_time.date_naive();
    let slot = appointment_time.format("%H:%M").to_string();
    if bookings.find_active_slot(date, &slot).await?.is_some() {
        return Err(BookingError::SlotConflict);
    }

    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        customer_name,
        phone_number,
        email: email.clone(),
        service_id: request.service_id.clone(),
        appointment_time,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        payment_session_id: None,
        created_at: now,
        updated_at: now,
    };

    let mut booking = bookings.create(booking).await?;
    info!("Created booking {} for {} {}", booking.id, date, slot);

    let Some(service) = service else {
        return Ok(CreatedBooking {
            booking,
            payment_url: None,
        });
    };

    let gateway = payments.ok_or_else(|| {
        BookingError::Payment("payment gateway is not configured".to_string())
    })?;

    let currency = config
        .stripe
        .as_ref()
        .and_then(|s| s.default_currency.clone())
        .unwrap_or_else(|| "usd".to_string());

    let checkout = CheckoutRequest {
        amount: service.price,
        currency,
        product_name: service.name.clone(),
        product_description: service
            .description
            .clone()
            .or_else(|| Some("Service booking".to_string())),
        customer_email: email.unwrap_or_default(),
        booking_id: booking.id.clone(),
    };

    match gateway.create_checkout_session(checkout).await {
        Ok(session) => {
            bookings
                .set_payment_session(&booking.id, &session.session_id)
                .await?;
            booking.payment_session_id = Some(session.session_id);
            Ok(CreatedBooking {
                booking,
                payment_url: Some(session.url),
            })
        }
        Err(err) => {
            // The booking survives a failed payment setup; the customer can
            // still pay later or the admin can follow up.
            warn!(
                "Checkout session creation for booking {} failed: {}",
                booking.id, err
            );
            Err(BookingError::Payment(err.to_string()))
        }
    }
}

/// All bookings, newest appointment first.
pub async fn list_bookings(bookings: &dyn BookingRepository) -> Result<Vec<Booking>, BookingError> {
    Ok(bookings.find_all().await?)
}

pub async fn get_booking(
    bookings: &dyn BookingRepository,
    id: &str,
) -> Result<Booking, BookingError> {
    bookings
        .find_by_id(id)
        .await?
        .ok_or(BookingError::NotFound("Booking"))
}

/// Applies a partial admin update. Fields are validated independently when
/// present; the slot conflict is not re-checked here, but the active-slot
/// index still rejects a move onto an occupied slot.
pub async fn update_booking(
    bookings: &dyn BookingRepository,
    id: &str,
    request: UpdateBookingRequest,
) -> Result<Booking, BookingError> {
    if bookings.find_by_id(id).await?.is_none() {
        return Err(BookingError::NotFound("Booking"));
    }

    let mut patch = BookingPatch::default();
    if let Some(name) = &request.customer_name {
        patch.customer_name = Some(validate_text("customer_name", name, MAX_NAME_LEN)?);
    }
    if let Some(phone) = &request.phone_number {
        patch.phone_number = Some(validate_text("phone_number", phone, MAX_PHONE_LEN)?);
    }
    if let Some(raw) = &request.appointment_time {
        let parsed = parse_appointment_time(raw)?;
        if parsed <= Utc::now() {
            return Err(BookingError::validation(
                "appointment_time",
                "must be in the future",
            ));
        }
        patch.appointment_time = Some(parsed);
    }
    if let Some(raw) = &request.status {
        patch.status = Some(raw.parse::<BookingStatus>().map_err(|_| {
            BookingError::validation(
                "status",
                "must be one of pending, confirmed, cancelled, completed",
            )
        })?);
    }
    if let Some(raw) = &request.payment_status {
        patch.payment_status = Some(raw.parse::<PaymentStatus>().map_err(|_| {
            BookingError::validation("payment_status", "must be one of unpaid, paid")
        })?);
    }

    bookings
        .update_fields(id, patch)
        .await?
        .ok_or(BookingError::NotFound("Booking"))
}

pub async fn delete_booking(
    bookings: &dyn BookingRepository,
    id: &str,
) -> Result<(), BookingError> {
    if bookings.delete(id).await? {
        info!("Deleted booking {}", id);
        Ok(())
    } else {
        Err(BookingError::NotFound("Booking"))
    }
}

// --- Service Catalog ---

pub async fn list_services(
    services: &dyn ServiceRepository,
) -> Result<Vec<ServiceRecord>, BookingError> {
    Ok(services.find_all().await?)
}

pub async fn get_service(
    services: &dyn ServiceRepository,
    id: &str,
) -> Result<ServiceRecord, BookingError> {
    services
        .find_by_id(id)
        .await?
        .ok_or(BookingError::NotFound("Service"))
}

pub async fn create_service(
    services: &dyn ServiceRepository,
    request: CreateServiceRequest,
) -> Result<ServiceRecord, BookingError> {
    let name = validate_text("name", &request.name, MAX_NAME_LEN)?;
    if request.price < 0 {
        return Err(BookingError::validation("price", "must not be negative"));
    }

    let now = Utc::now();
    let service = ServiceRecord {
        id: Uuid::new_v4().to_string(),
        name,
        description: request.description,
        price: request.price,
        created_at: now,
        updated_at: now,
    };
    Ok(services.create(service).await?)
}

pub async fn update_service(
    services: &dyn ServiceRepository,
    id: &str,
    request: UpdateServiceRequest,
) -> Result<ServiceRecord, BookingError> {
    let mut patch = ServicePatch::default();
    if let Some(name) = &request.name {
        patch.name = Some(validate_text("name", name, MAX_NAME_LEN)?);
    }
    if let Some(price) = request.price {
        if price < 0 {
            return Err(BookingError::validation("price", "must not be negative"));
        }
        patch.price = Some(price);
    }
    patch.description = request.description;

    services
        .update_fields(id, patch)
        .await?
        .ok_or(BookingError::NotFound("Service"))
}

pub async fn delete_service(
    services: &dyn ServiceRepository,
    id: &str,
) -> Result<(), BookingError> {
    if services.delete(id).await? {
        Ok(())
    } else {
        Err(BookingError::NotFound("Service"))
    }
}
