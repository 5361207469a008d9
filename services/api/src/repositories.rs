//! Postgres implementations of the domain record store ports

use domain::{StoreError, StoreResult};
use sqlx::{Postgres, Row, postgres::PgRow};
use std::str::FromStr;
use tracing::error;

pub mod appointment;
pub mod commission;
pub mod order;
pub mod service;

pub use appointment::PgAppointmentRepository;
pub use commission::PgCommissionRepository;
pub use order::PgOrderRepository;
pub use service::PgServiceRepository;

/// Map a driver error onto the store contract. Unique violations become
/// conflicts so the core can tell them apart from outages.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    error!("Database query failed: {}", err);
    StoreError::Backend(err.to_string())
}

/// Read one column, reporting decode failures as backend errors
pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(store_error)
}

/// Status columns are TEXT with a CHECK constraint
pub(crate) fn parse_column<T>(raw: &str) -> StoreResult<T>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>().map_err(StoreError::Backend)
}
