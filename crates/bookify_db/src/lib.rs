//! Database integration for Bookify
//!
//! Provides a database-agnostic client over SQLx (SQLite by default,
//! PostgreSQL and MySQL behind feature flags) plus the repository ports
//! and SQL implementations for bookings and the service catalog.

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    Booking, BookingPatch, BookingRepository, BookingStatus, PaymentStatus, ServicePatch,
    ServiceRecord, ServiceRepository, SqlBookingRepository, SqlServiceRepository,
};
