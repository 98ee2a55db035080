//! SQL implementation of the booking repository
//!
//! Rows keep the appointment timestamp as RFC 3339 text alongside derived
//! `appointment_date` / `appointment_slot` columns. Those two columns carry
//! the partial unique index that makes the slot-conflict check atomic:
//! a concurrent insert for the same slot loses at the constraint, not at
//! the preceding read.

use crate::error::{classify_sqlx_error, DbError};
use crate::repositories::booking::{
    Booking, BookingPatch, BookingRepository, BookingStatus, PaymentStatus,
};
use crate::DbClient;
use bookify_common::BoxFuture;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the booking repository
#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    db_client: DbClient,
}

impl SqlBookingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn row_to_booking(row: &AnyRow) -> Result<Booking, DbError> {
    let parse_time = |column: &str| -> Result<DateTime<Utc>, DbError> {
        let raw: String = row
            .try_get(column)
            .map_err(|e| DbError::DecodeError(e.to_string()))?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
    };

    let status: String = row
        .try_get("status")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let payment_status: String = row
        .try_get("payment_status")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;

    Ok(Booking {
        id: row
            .try_get("id")
            .map_err(|e| DbError::DecodeError(e.to_string()))?,
        customer_name: row.try_get("customer_name").unwrap_or_default(),
        phone_number: row.try_get("phone_number").unwrap_or_default(),
        email: row.try_get("email").ok(),
        service_id: row.try_get("service_id").ok(),
        appointment_time: parse_time("appointment_time")?,
        status: status.parse::<BookingStatus>().map_err(DbError::DecodeError)?,
        payment_status: payment_status
            .parse::<PaymentStatus>()
            .map_err(DbError::DecodeError)?,
        payment_session_id: row.try_get("payment_session_id").ok(),
        created_at: parse_time("created_at")?,
        updated_at: parse_time("updated_at")?,
    })
}

const SELECT_COLUMNS: &str = "id, customer_name, phone_number, email, service_id, \
     appointment_time, status, payment_status, payment_session_id, created_at, updated_at";

impl BookingRepository for SqlBookingRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing bookings schema");

            let table = r#"
                CREATE TABLE IF NOT EXISTS bookings (
                    id TEXT PRIMARY KEY,
                    customer_name TEXT NOT NULL,
                    phone_number TEXT NOT NULL,
                    email TEXT,
                    service_id TEXT,
                    appointment_time TEXT NOT NULL,
                    appointment_date TEXT NOT NULL,
                    appointment_slot TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    payment_status TEXT NOT NULL DEFAULT 'unpaid',
                    payment_session_id TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
            "#;
            self.db_client.execute(table).await?;

            // Cancelled rows fall out of the index, so a freed slot can be
            // rebooked while the cancelled booking stays on record.
            let index = r#"
                CREATE UNIQUE INDEX IF NOT EXISTS ux_bookings_active_slot
                ON bookings (appointment_date, appointment_slot)
                WHERE status != 'cancelled'
            "#;
            self.db_client.execute(index).await?;

            info!("Bookings schema initialized successfully");
            Ok(())
        })
    }

    fn create(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError> {
        Box::pin(async move {
            debug!("Inserting booking {}", booking.id);

            let query = r#"
                INSERT INTO bookings (
                    id, customer_name, phone_number, email, service_id,
                    appointment_time, appointment_date, appointment_slot,
                    status, payment_status, payment_session_id, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#;

            sqlx::query(query)
                .bind(&booking.id)
                .bind(&booking.customer_name)
                .bind(&booking.phone_number)
                .bind(&booking.email)
                .bind(&booking.service_id)
                .bind(booking.appointment_time.to_rfc3339())
                .bind(booking.appointment_date().format("%Y-%m-%d").to_string())
                .bind(booking.appointment_slot())
                .bind(booking.status.as_str())
                .bind(booking.payment_status.as_str())
                .bind(&booking.payment_session_id)
                .bind(booking.created_at.to_rfc3339())
                .bind(booking.updated_at.to_rfc3339())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to insert booking: {}", e);
                    classify_sqlx_error(e)
                })?;

            Ok(booking)
        })
    }

    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<Booking>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let query =
                format!("SELECT {} FROM bookings WHERE id = $1", SELECT_COLUMNS);

            let row = sqlx::query(&query)
                .bind(&id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            row.as_ref().map(row_to_booking).transpose()
        })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<Booking>, DbError> {
        Box::pin(async move {
            let query = format!(
                "SELECT {} FROM bookings ORDER BY appointment_time DESC",
                SELECT_COLUMNS
            );

            let rows = sqlx::query(&query)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            rows.iter().map(row_to_booking).collect()
        })
    }

    fn find_by_date(&self, date: NaiveDate) -> BoxFuture<'_, Vec<Booking>, DbError> {
        Box::pin(async move {
            let query = format!(
                "SELECT {} FROM bookings WHERE appointment_date = $1 ORDER BY appointment_slot",
                SELECT_COLUMNS
            );

            let rows = sqlx::query(&query)
                .bind(date.format("%Y-%m-%d").to_string())
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            rows.iter().map(row_to_booking).collect()
        })
    }

    fn find_active_slot(
        &self,
        date: NaiveDate,
        slot: &str,
    ) -> BoxFuture<'_, Option<Booking>, DbError> {
        let slot = slot.to_string();
        Box::pin(async move {
            let query = format!(
                "SELECT {} FROM bookings \
                 WHERE appointment_date = $1 AND appointment_slot = $2 AND status != 'cancelled'",
                SELECT_COLUMNS
            );

            let row = sqlx::query(&query)
                .bind(date.format("%Y-%m-%d").to_string())
                .bind(&slot)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            row.as_ref().map(row_to_booking).transpose()
        })
    }

    fn update_fields(
        &self,
        id: &str,
        patch: BookingPatch,
    ) -> BoxFuture<'_, Option<Booking>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let Some(existing) = self.find_by_id(&id).await? else {
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

            let query = r#"
                UPDATE bookings
                SET customer_name = $1, phone_number = $2,
                    appointment_time = $3, appointment_date = $4, appointment_slot = $5,
                    status = $6, payment_status = $7, updated_at = $8
                WHERE id = $9
            "#;

            sqlx::query(query)
                .bind(&updated.customer_name)
                .bind(&updated.phone_number)
                .bind(updated.appointment_time.to_rfc3339())
                .bind(updated.appointment_date().format("%Y-%m-%d").to_string())
                .bind(updated.appointment_slot())
                .bind(updated.status.as_str())
                .bind(updated.payment_status.as_str())
                .bind(updated.updated_at.to_rfc3339())
                .bind(&updated.id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to update booking {}: {}", updated.id, e);
                    classify_sqlx_error(e)
                })?;

            Ok(Some(updated))
        })
    }

    fn set_payment_session(&self, id: &str, session_id: &str) -> BoxFuture<'_, (), DbError> {
        let id = id.to_string();
        let session_id = session_id.to_string();
        Box::pin(async move {
            let query = r#"
                UPDATE bookings
                SET payment_session_id = $1, updated_at = $2
                WHERE id = $3
            "#;

            sqlx::query(query)
                .bind(&session_id)
                .bind(Utc::now().to_rfc3339())
                .bind(&id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            Ok(())
        })
    }

    fn mark_paid(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            // Writing 'paid' over 'paid' is harmless, which is what makes
            // redelivered webhook events safe.
            let query = r#"
                UPDATE bookings
                SET payment_status = 'paid', updated_at = $1
                WHERE id = $2
            "#;

            let result = sqlx::query(query)
                .bind(Utc::now().to_rfc3339())
                .bind(&id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            debug!("Deleting booking {}", id);

            let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
                .bind(&id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn purge_abandoned(&self, before: DateTime<Utc>) -> BoxFuture<'_, u64, DbError> {
        Box::pin(async move {
            // RFC 3339 UTC strings compare lexicographically in time order
            let query = r#"
                DELETE FROM bookings
                WHERE status = 'pending' AND payment_status = 'unpaid' AND created_at < $1
            "#;

            let result = sqlx::query(query)
                .bind(before.to_rfc3339())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            let purged = result.rows_affected();
            if purged > 0 {
                info!("Purged {} abandoned pending bookings", purged);
            }
            Ok(purged)
        })
    }
}
