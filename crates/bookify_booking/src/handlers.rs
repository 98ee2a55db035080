// --- File: crates/bookify_booking/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::BookingError;
use crate::logic::{
    self, AvailabilityQuery, CreateBookingRequest, CreateServiceRequest, SlotAvailability,
    UpdateBookingRequest, UpdateServiceRequest,
};
use bookify_common::services::{BoxedError, PaymentService};
use bookify_config::AppConfig;
use bookify_db::{Booking, BookingRepository, ServiceRecord, ServiceRepository};

// --- State for Booking Handlers ---
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub bookings: Arc<dyn BookingRepository>,
    pub services: Arc<dyn ServiceRepository>,
    /// Absent when the payment gateway is disabled; bookings still work,
    /// pay-at-booking requests fail with a payment error.
    pub payments: Option<Arc<dyn PaymentService<Error = BoxedError>>>,
}

// --- Response envelopes ---

#[derive(Serialize, Debug)]
pub struct BookingListResponse {
    pub success: bool,
    pub bookings: Vec<Booking>,
}

#[derive(Serialize, Debug)]
pub struct BookingDetailResponse {
    pub success: bool,
    pub booking: Booking,
}

#[derive(Serialize, Debug)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub message: String,
    pub booking: Booking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct UpdateBookingResponse {
    pub success: bool,
    pub message: String,
    pub booking: Booking,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct ServiceListResponse {
    pub success: bool,
    pub services: Vec<ServiceRecord>,
}

#[derive(Serialize, Debug)]
pub struct ServiceDetailResponse {
    pub success: bool,
    pub service: ServiceRecord,
}

// --- Booking handlers ---

pub async fn available_slots_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<SlotAvailability>, BookingError> {
    let availability =
        logic::available_slots(state.bookings.as_ref(), &state.config.booking, &query.date)
            .await?;
    Ok(Json(availability))
}

pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), BookingError> {
    let created = logic::create_booking(
        state.bookings.as_ref(),
        state.services.as_ref(),
        state.payments.as_deref(),
        &state.config,
        payload,
    )
    .await?;

    let message = if created.payment_url.is_some() {
        "Booking created. Redirect to checkout for payment.".to_string()
    } else {
        "Booking created successfully.".to_string()
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            success: true,
            message,
            booking: created.booking,
            payment_url: created.payment_url,
        }),
    ))
}

pub async fn list_bookings_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<BookingListResponse>, BookingError> {
    let bookings = logic::list_bookings(state.bookings.as_ref()).await?;
    Ok(Json(BookingListResponse {
        success: true,
        bookings,
    }))
}

pub async fn get_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetailResponse>, BookingError> {
    let booking = logic::get_booking(state.bookings.as_ref(), &id).await?;
    Ok(Json(BookingDetailResponse {
        success: true,
        booking,
    }))
}

pub async fn update_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<Json<UpdateBookingResponse>, BookingError> {
    let booking = logic::update_booking(state.bookings.as_ref(), &id, payload).await?;
    Ok(Json(UpdateBookingResponse {
        success: true,
        message: "Booking updated successfully.".to_string(),
        booking,
    }))
}

pub async fn delete_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, BookingError> {
    logic::delete_booking(state.bookings.as_ref(), &id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Booking deleted successfully.".to_string(),
    }))
}

// --- Service handlers ---

pub async fn list_services_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<ServiceListResponse>, BookingError> {
    let services = logic::list_services(state.services.as_ref()).await?;
    Ok(Json(ServiceListResponse {
        success: true,
        services,
    }))
}

pub async fn get_service_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<String>,
) -> Result<Json<ServiceDetailResponse>, BookingError> {
    let service = logic::get_service(state.services.as_ref(), &id).await?;
    Ok(Json(ServiceDetailResponse {
        success: true,
        service,
    }))
}

pub async fn create_service_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceDetailResponse>), BookingError> {
    let service = logic::create_service(state.services.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ServiceDetailResponse {
            success: true,
            service,
        }),
    ))
}

pub async fn update_service_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<Json<ServiceDetailResponse>, BookingError> {
    let service = logic::update_service(state.services.as_ref(), &id, payload).await?;
    Ok(Json(ServiceDetailResponse {
        success: true,
        service,
    }))
}

pub async fn delete_service_handler(
    State(state): State<Arc<BookingState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, BookingError> {
    logic::delete_service(state.services.as_ref(), &id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Service deleted successfully.".to_string(),
    }))
}
