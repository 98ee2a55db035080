//! Service catalog model and repository port

use crate::error::DbError;
use bookify_common::BoxFuture;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookable service. Price is in minor currency units (cents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a service; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

/// Persistence port for the service catalog.
pub trait ServiceRepository: Send + Sync {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    fn create(&self, service: ServiceRecord) -> BoxFuture<'_, ServiceRecord, DbError>;

    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<ServiceRecord>, DbError>;

    fn find_all(&self) -> BoxFuture<'_, Vec<ServiceRecord>, DbError>;

    /// Apply a partial update; returns the updated service, or None when the
    /// id is unknown.
    fn update_fields(
        &self,
        id: &str,
        patch: ServicePatch,
    ) -> BoxFuture<'_, Option<ServiceRecord>, DbError>;

    /// Hard delete. Returns false when the id is unknown.
    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError>;
}
