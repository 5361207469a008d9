//! Service catalog repository

use async_trait::async_trait;
use domain::{
    StoreError, StoreResult,
    models::Service,
    store::ServiceRepo,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::store_error;

const COLUMNS: &str = "id, salon_id, name, description, duration_minutes, price, category, image, \
                       is_active, created_at, updated_at";

/// Service repository for database operations
#[derive(Clone)]
pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    /// Create a new service repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn from_row(row: &PgRow) -> Result<Service, sqlx::Error> {
    Ok(Service {
        id: row.try_get("id")?,
        salon_id: row.try_get("salon_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        duration_minutes: row.try_get("duration_minutes")?,
        price: row.try_get("price")?,
        category: row.try_get("category")?,
        image: row.try_get("image")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ServiceRepo for PgServiceRepository {
    async fn find_by_salon(&self, salon_id: Uuid) -> StoreResult<Vec<Service>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM services WHERE salon_id = $1 ORDER BY created_at ASC"
        ))
        .bind(salon_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(|row| from_row(row).map_err(store_error))
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM services WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref()
            .map(from_row)
            .transpose()
            .map_err(store_error)
    }

    async fn create(&self, service: Service) -> StoreResult<Service> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO services (id, salon_id, name, description, duration_minutes, price,
                                  category, image, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(service.id)
        .bind(service.salon_id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(&service.category)
        .bind(&service.image)
        .bind(service.is_active)
        .bind(service.created_at)
        .bind(service.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        from_row(&row).map_err(store_error)
    }

    async fn update(&self, service: Service) -> StoreResult<Service> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE services
            SET name = $2, description = $3, duration_minutes = $4, price = $5,
                category = $6, image = $7, is_active = $8, updated_at = $9
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(&service.category)
        .bind(&service.image)
        .bind(service.is_active)
        .bind(service.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?
        .ok_or(StoreError::NotFound {
            entity: "Service",
            id: service.id,
        })?;

        from_row(&row).map_err(store_error)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Service",
                id,
            });
        }
        Ok(())
    }
}
