//! SQL implementation of the service repository

use crate::error::DbError;
use crate::repositories::service::{ServicePatch, ServiceRecord, ServiceRepository};
use crate::DbClient;
use bookify_common::BoxFuture;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the service repository
#[derive(Debug, Clone)]
pub struct SqlServiceRepository {
    db_client: DbClient,
}

impl SqlServiceRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn row_to_service(row: &AnyRow) -> Result<ServiceRecord, DbError> {
    let parse_time = |column: &str| -> Result<DateTime<Utc>, DbError> {
        let raw: String = row
            .try_get(column)
            .map_err(|e| DbError::DecodeError(e.to_string()))?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
    };

    Ok(ServiceRecord {
        id: row
            .try_get("id")
            .map_err(|e| DbError::DecodeError(e.to_string()))?,
        name: row.try_get("name").unwrap_or_default(),
        description: row.try_get("description").ok(),
        price: row.try_get("price").unwrap_or_default(),
        created_at: parse_time("created_at")?,
        updated_at: parse_time("updated_at")?,
    })
}

impl ServiceRepository for SqlServiceRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing services schema");

            let table = r#"
                CREATE TABLE IF NOT EXISTS services (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    price INTEGER NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
            "#;
            self.db_client.execute(table).await?;

            info!("Services schema initialized successfully");
            Ok(())
        })
    }

    fn create(&self, service: ServiceRecord) -> BoxFuture<'_, ServiceRecord, DbError> {
        Box::pin(async move {
            debug!("Inserting service {}", service.id);

            let query = r#"
                INSERT INTO services (id, name, description, price, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#;

            sqlx::query(query)
                .bind(&service.id)
                .bind(&service.name)
                .bind(&service.description)
                .bind(service.price)
                .bind(service.created_at.to_rfc3339())
                .bind(service.updated_at.to_rfc3339())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to insert service: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(service)
        })
    }

    fn find_by_id(&self, id: &str) -> BoxFuture<'_, Option<ServiceRecord>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let query = "SELECT id, name, description, price, created_at, updated_at \
                         FROM services WHERE id = $1";

            let row = sqlx::query(query)
                .bind(&id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            row.as_ref().map(row_to_service).transpose()
        })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<ServiceRecord>, DbError> {
        Box::pin(async move {
            let query = "SELECT id, name, description, price, created_at, updated_at \
                         FROM services ORDER BY name";

            let rows = sqlx::query(query)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            rows.iter().map(row_to_service).collect()
        })
    }

    fn update_fields(
        &self,
        id: &str,
        patch: ServicePatch,
    ) -> BoxFuture<'_, Option<ServiceRecord>, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let Some(existing) = self.find_by_id(&id).await? else {
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
            updated.updated_at = Utc::now();

            let query = r#"
                UPDATE services
                SET name = $1, description = $2, price = $3, updated_at = $4
                WHERE id = $5
            "#;

            sqlx::query(query)
                .bind(&updated.name)
                .bind(&updated.description)
                .bind(updated.price)
                .bind(updated.updated_at.to_rfc3339())
                .bind(&updated.id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            Ok(Some(updated))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, bool, DbError> {
        let id = id.to_string();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM services WHERE id = $1")
                .bind(&id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            Ok(result.rows_affected() > 0)
        })
    }
}
