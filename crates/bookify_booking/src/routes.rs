// --- File: crates/bookify_booking/src/routes.rs ---

use crate::handlers::{
    available_slots_handler, create_booking_handler, create_service_handler,
    delete_booking_handler, delete_service_handler, get_booking_handler, get_service_handler,
    list_bookings_handler, list_services_handler, update_booking_handler, update_service_handler,
    BookingState,
};
use axum::{routing::get, Router};
use std::sync::Arc;

/// Creates a router containing all booking and service-catalog routes.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/available-slots", get(available_slots_handler))
        .route(
            "/bookings",
            get(list_bookings_handler).post(create_booking_handler),
        )
        .route(
            "/bookings/{id}",
            get(get_booking_handler)
                .patch(update_booking_handler)
                .put(update_booking_handler)
                .delete(delete_booking_handler),
        )
        .route(
            "/services",
            get(list_services_handler).post(create_service_handler),
        )
        .route(
            "/services/{id}",
            get(get_service_handler)
                .patch(update_service_handler)
                .delete(delete_service_handler),
        )
        .with_state(state)
}
