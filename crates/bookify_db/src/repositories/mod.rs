//! Repository ports and their SQL implementations

pub mod booking;
pub mod booking_sql;
pub mod service;
pub mod service_sql;

pub use booking::{Booking, BookingPatch, BookingRepository, BookingStatus, PaymentStatus};
pub use booking_sql::SqlBookingRepository;
pub use service::{ServicePatch, ServiceRecord, ServiceRepository};
pub use service_sql::SqlServiceRepository;
