//! Appointment repository

use async_trait::async_trait;
use domain::{
    StoreError, StoreResult,
    models::Appointment,
    store::{AppointmentFilter, AppointmentRepo},
};
use sqlx::{PgPool, postgres::PgRow};
use uuid::Uuid;

use super::{column, parse_column, store_error};

const COLUMNS: &str = "id, customer_id, salon_id, service_id, start_time, end_time, status, \
                       notes, created_at, updated_at";

/// Appointment repository for database operations
#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    /// Create a new appointment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn from_row(row: &PgRow) -> StoreResult<Appointment> {
    let status: String = column(row, "status")?;
    Ok(Appointment {
        id: column(row, "id")?,
        customer_id: column(row, "customer_id")?,
        salon_id: column(row, "salon_id")?,
        service_id: column(row, "service_id")?,
        start_time: column(row, "start_time")?,
        end_time: column(row, "end_time")?,
        status: parse_column(&status)?,
        notes: column(row, "notes")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

#[async_trait]
impl AppointmentRepo for PgAppointmentRepository {
    async fn find(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM appointments
            WHERE ($1::uuid IS NULL OR salon_id = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::timestamptz IS NULL OR start_time >= $4)
              AND ($5::timestamptz IS NULL OR start_time < $5)
            ORDER BY start_time ASC
            "#
        ))
        .bind(filter.salon_id)
        .bind(filter.customer_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.starts_from)
        .bind(filter.starts_before)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM appointments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(from_row).transpose()
    }

    async fn create(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO appointments (id, customer_id, salon_id, service_id, start_time,
                                      end_time, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(appointment.id)
        .bind(appointment.customer_id)
        .bind(appointment.salon_id)
        .bind(appointment.service_id)
        .bind(appointment.start_time)
        .bind(appointment.end_time)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        from_row(&row)
    }

    async fn update(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE appointments
            SET service_id = $2, start_time = $3, end_time = $4, status = $5,
                notes = $6, updated_at = $7
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(appointment.id)
        .bind(appointment.service_id)
        .bind(appointment.start_time)
        .bind(appointment.end_time)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(appointment.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?
        .ok_or(StoreError::NotFound {
            entity: "Appointment",
            id: appointment.id,
        })?;

        from_row(&row)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Appointment",
                id,
            });
        }
        Ok(())
    }
}
