//! Commission repository

use async_trait::async_trait;
use domain::{
    StoreResult,
    models::Commission,
    store::{CommissionFilter, CommissionRepo},
};
use sqlx::{PgConnection, PgPool, postgres::PgRow};
use uuid::Uuid;

use super::{column, parse_column, store_error};

pub(crate) const COLUMNS: &str =
    "id, salon_id, order_id, amount, status, payment_date, created_at, updated_at";

/// Commission repository for database operations
#[derive(Clone)]
pub struct PgCommissionRepository {
    pool: PgPool,
}

impl PgCommissionRepository {
    /// Create a new commission repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn from_row(row: &PgRow) -> StoreResult<Commission> {
    let status: String = column(row, "status")?;
    Ok(Commission {
        id: column(row, "id")?,
        salon_id: column(row, "salon_id")?,
        order_id: column(row, "order_id")?,
        amount: column(row, "amount")?,
        status: parse_column(&status)?,
        payment_date: column(row, "payment_date")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

/// Insert on any connection so order creation can reuse it inside its transaction.
/// A second commission for the same order trips the UNIQUE constraint.
pub(crate) async fn insert(conn: &mut PgConnection, commission: &Commission) -> StoreResult<Commission> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO commissions (id, salon_id, order_id, amount, status, payment_date,
                                 created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(commission.id)
    .bind(commission.salon_id)
    .bind(commission.order_id)
    .bind(commission.amount)
    .bind(commission.status.as_str())
    .bind(commission.payment_date)
    .bind(commission.created_at)
    .bind(commission.updated_at)
    .fetch_one(conn)
    .await
    .map_err(store_error)?;

    from_row(&row)
}

#[async_trait]
impl CommissionRepo for PgCommissionRepository {
    async fn find(&self, filter: &CommissionFilter) -> StoreResult<Vec<Commission>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM commissions
            WHERE ($1::uuid IS NULL OR salon_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.salon_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Commission>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM commissions WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(from_row).transpose()
    }

    async fn create(&self, commission: Commission) -> StoreResult<Commission> {
        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        insert(&mut conn, &commission).await
    }

    async fn mark_paid(&self, commission: Commission) -> StoreResult<Option<Commission>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE commissions
            SET status = $2, payment_date = $3, updated_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING {COLUMNS}
            "#
        ))
        .bind(commission.id)
        .bind(commission.status.as_str())
        .bind(commission.payment_date)
        .bind(commission.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.as_ref().map(from_row).transpose()
    }
}
