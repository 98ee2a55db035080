//! Booking model and repository port
//!
//! The repository trait is the persistence seam of the booking lifecycle:
//! handlers and logic hold an `Arc<dyn BookingRepository>` and never touch
//! SQL directly. Rows move in and out as immutable `Booking` values.

use crate::error::DbError;
use bookify_common::BoxFuture;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Booking lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// Payment state of a booking. Unpaid covers both "never attempted" and
/// "attempted and failed"; the checkout can be retried while unpaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// A booking row as stored. Appointment times are UTC; the date and
/// time-of-day slot are derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub service_id: Option<String>,
    pub appointment_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Hosted checkout session id, once one has been opened for this booking
    pub payment_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Calendar date of the appointment.
    pub fn appointment_date(&self) -> NaiveDate {
        self.appointment_time.date_naive()
    }

    /// Time-of-day slot of the appointment, "HH:MM".
    pub fn appointment_slot(&self) -> String {
        self.appointment_time.format("%H:%M").to_string()
    }

    /// Whether this booking occupies its slot.
    pub fn occupies_slot(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

/// Partial update for a booking; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub appointment_time: Option<DateTime<Utc>>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl BookingPatch {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.phone_number.is_none()
            && self.appointment_time.is_none()
            && self.status.is_none()
            && self.payment_status.is_none()
    }
}

/// Persistence port for bookings.
pub trait BookingRepository: Send + Sync {
    /// Create the bookings table and the active-slot unique index.
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a new booking. Fails with `DbError::UniqueViolation` when a
    /// non-cancelled booking already holds the same (date, slot) pair.
    fn create(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError>;

    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<Booking>, DbError>;

    /// All bookings, newest appointment first.
    fn find_all(&self) -> BoxFuture<'_, Vec<Booking>, DbError>;

    /// Bookings whose appointment falls on the given calendar date.
    fn find_by_date(&self, date: NaiveDate) -> BoxFuture<'_, Vec<Booking>, DbError>;

    /// The non-cancelled booking occupying (date, slot), if any.
    fn find_active_slot(
        &self,
        date: NaiveDate,
        slot: &str,
    ) -> BoxFuture<'_, Option<Booking>, DbError>;

    /// Apply a partial update; returns the updated booking, or None when the
    /// id is unknown. Moving onto an occupied slot surfaces as
    /// `DbError::UniqueViolation`.
    fn update_fields(
        &self,
        id: &str,
        patch: BookingPatch,
    ) -> BoxFuture<'_, Option<Booking>, DbError>;

    /// Record the checkout session opened for a booking.
    fn set_payment_session(&self, id: &str, session_id: &str) -> BoxFuture<'_, (), DbError>;

    /// Mark a booking paid. Idempotent: marking an already-paid booking is a
    /// successful no-op. Returns false when the id is unknown.
    fn mark_paid(&self, id: &str) -> BoxFuture<'_, bool, DbError>;

    /// Hard delete. Returns false when the id is unknown.
    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError>;

    /// Delete pending, unpaid bookings created before the cutoff. Returns
    /// the number of rows removed.
    fn purge_abandoned(&self, before: DateTime<Utc>) -> BoxFuture<'_, u64, DbError>;
}
