//! In-memory doubles shared by the unit and router tests.

use bookify_common::services::{
    BoxFuture, BoxedError, CheckoutRequest, CheckoutSession, PaymentIntent, PaymentService,
};
use bookify_db::{
    Booking, BookingPatch, BookingRepository, BookingStatus, DbError, PaymentStatus, ServicePatch,
    ServiceRecord, ServiceRepository,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct InMemoryBookings {
    pub(crate) rows: Mutex<HashMap<String, Booking>>,
}

impl InMemoryBookings {
    pub(crate) fn insert(&self, booking: Booking) {
        self.rows
            .lock()
            .unwrap()
            .insert(booking.id.clone(), booking);
    }

    pub(crate) fn get(&self, id: &str) -> Option<Booking> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl BookingRepository for InMemoryBookings {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async { Ok(()) })
    }

    fn create(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError> {
        Box::pin(async move {
            let mut rows = self.rows.lock().unwrap();
            // Mirrors the active-slot unique index
            let taken = rows.values().any(|b| {
                b.occupies_slot()
                    && b.appointment_date() == booking.appointment_date()
                    && b.appointment_slot() == booking.appointment_slot()
            });
            if taken {
                return Err(DbError::UniqueViolation(
                    "ux_bookings_active_slot".to_string(),
                ));
            }
            rows.insert(booking.id.clone(), booking.clone());
            Ok(booking)
        })
    }

    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<Booking>, DbError> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.rows.lock().unwrap().get(&id).cloned()) })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<Booking>, DbError> {
        Box::pin(async move {
            let mut all: Vec<Booking> = self.rows.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| b.appointment_time.cmp(&a.appointment_time));
            Ok(all)
        })
    }

    fn find_by_date(&self, date: NaiveDate) -> BoxFuture<'_, Vec<Booking>, DbError> {
        Box::pin(async move {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.appointment_date() == date)
                .cloned()
                .collect())
        })
    }

    fn find_active_slot(
        &self,
        date: NaiveDate,
        slot: &str,
    ) -> BoxFuture<'_, Option<Booking>, DbError> {
        let slot = slot.to_string();
        Box::pin(async move {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|b| {
                    b.occupies_slot()
                        && b.appointment_date() == date
                        && b.appointment_slot() == slot
                })
                .cloned())
        })
    }

    fn update_fields(
        &self,
        id: &str,
        patch: BookingPatch,
    ) -> BoxFuture<'_, Option<Booking>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let mut rows = self.rows.lock().unwrap();
            let Some(existing) = rows.get(&id).cloned() else {
                return Ok(None);
            };
            let mut updated = existing;
            if let Some(name) = patch.customer_name {
                updated.customer_name = name;
            }
            if let Some(phone) = patch.phone_number {
                updated.phone_number = phone;
            }
            if let Some(time) = patch.appointment_time {
                updated.appointment_time = time;
            }
            if let Some(status) = patch.status {
                updated.status = status;
            }
            if let Some(payment_status) = patch.payment_status {
                updated.payment_status = payment_status;
            }
            updated.updated_at = Utc::now();
            rows.insert(id, updated.clone());
            Ok(Some(updated))
        })
    }

    fn set_payment_session(&self, id: &str, session_id: &str) -> BoxFuture<'_, (), DbError> {
        let id = id.to_string();
        let session_id = session_id.to_string();
        Box::pin(async move {
            if let Some(booking) = self.rows.lock().unwrap().get_mut(&id) {
                booking.payment_session_id = Some(session_id);
            }
            Ok(())
        })
    }

    fn mark_paid(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&id) {
                Some(booking) => {
                    booking.payment_status = PaymentStatus::Paid;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.rows.lock().unwrap().remove(&id).is_some()) })
    }

    fn purge_abandoned(&self, before: DateTime<Utc>) -> BoxFuture<'_, u64, DbError> {
        Box::pin(async move {
            let mut rows = self.rows.lock().unwrap();
            let doomed: Vec<String> = rows
                .values()
                .filter(|b| {
                    b.status == BookingStatus::Pending
                        && b.payment_status == PaymentStatus::Unpaid
                        && b.created_at < before
                })
                .map(|b| b.id.clone())
                .collect();
            for id in &doomed {
                rows.remove(id);
            }
            Ok(doomed.len() as u64)
        })
    }
}

#[derive(Default)]
pub(crate) struct InMemoryServices {
    pub(crate) rows: Mutex<HashMap<String, ServiceRecord>>,
}

impl ServiceRepository for InMemoryServices {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async { Ok(()) })
    }

    fn create(&self, service: ServiceRecord) -> BoxFuture<'_, ServiceRecord, DbError> {
        Box::pin(async move {
            self.rows
                .lock()
                .unwrap()
                .insert(service.id.clone(), service.clone());
            Ok(service)
        })
    }

    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<ServiceRecord>, DbError> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.rows.lock().unwrap().get(&id).cloned()) })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<ServiceRecord>, DbError> {
        Box::pin(async move { Ok(self.rows.lock().unwrap().values().cloned().collect()) })
    }

    fn update_fields(
        &self,
        id: &str,
        patch: ServicePatch,
    ) -> BoxFuture<'_, Option<ServiceRecord>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let mut rows = self.rows.lock().unwrap();
            let Some(existing) = rows.get(&id).cloned() else {
                return Ok(None);
            };
            let mut updated = existing;
            if let Some(name) = patch.name {
                updated.name = name;
            }
            if let Some(description) = patch.description {
                updated.description = Some(description);
            }
            if let Some(price) = patch.price {
                updated.price = price;
            }
            rows.insert(id, updated.clone());
            Ok(Some(updated))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.rows.lock().unwrap().remove(&id).is_some()) })
    }
}

pub(crate) struct OkPayments;

impl PaymentService for OkPayments {
    type Error = BoxedError;

    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
        Box::pin(async move {
            Ok(CheckoutSession {
                session_id: format!("cs_test_{}", request.booking_id),
                url: "https://checkout.example/pay/cs_test".to_string(),
            })
        })
    }

    fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        _customer_name: Option<&str>,
        _booking_id: Option<&str>,
    ) -> BoxFuture<'_, PaymentIntent, BoxedError> {
        let currency = currency.to_string();
        Box::pin(async move {
            Ok(PaymentIntent {
                id: "pi_test".to_string(),
                client_secret: "pi_test_secret".to_string(),
                amount,
                currency,
            })
        })
    }
}

pub(crate) struct FailingPayments;

impl PaymentService for FailingPayments {
    type Error = BoxedError;

    fn create_checkout_session(
        &self,
        _request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
        Box::pin(async { Err(BoxedError("gateway unavailable".into())) })
    }

    fn create_payment_intent(
        &self,
        _amount: i64,
        _currency: &str,
        _customer_name: Option<&str>,
        _booking_id: Option<&str>,
    ) -> BoxFuture<'_, PaymentIntent, BoxedError> {
        Box::pin(async { Err(BoxedError("gateway unavailable".into())) })
    }
}
