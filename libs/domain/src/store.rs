//! Record store ports
//!
//! Any persistence backend must implement these traits. The core only ever
//! talks to storage through them, and expects unique-constraint violations to
//! come back as [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, Commission, CommissionStatus, Order, OrderStatus, Service,
};

/// Failures reported by a record store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Unique constraint violation
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else the backend could not do
    #[error("backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Structured predicate over appointments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub salon_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// Inclusive lower bound on `start_time`
    pub starts_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `start_time`
    pub starts_before: Option<DateTime<Utc>>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.salon_id.is_none_or(|id| appointment.salon_id == id)
            && self.customer_id.is_none_or(|id| appointment.customer_id == id)
            && self.status.is_none_or(|s| appointment.status == s)
            && self.starts_from.is_none_or(|t| appointment.start_time >= t)
            && self.starts_before.is_none_or(|t| appointment.start_time < t)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub salon_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.salon_id.is_none_or(|id| order.salon_id == id)
            && self.customer_id.is_none_or(|id| order.customer_id == id)
            && self.status.is_none_or(|s| order.status == s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommissionFilter {
    pub salon_id: Option<Uuid>,
    pub status: Option<CommissionStatus>,
}

impl CommissionFilter {
    pub fn matches(&self, commission: &Commission) -> bool {
        self.salon_id.is_none_or(|id| commission.salon_id == id)
            && self.status.is_none_or(|s| commission.status == s)
    }
}

/// Persistence contract for the service catalog
#[async_trait]
pub trait ServiceRepo: Send + Sync {
    /// A salon's services, oldest first (`created_at` ascending)
    async fn find_by_salon(&self, salon_id: Uuid) -> StoreResult<Vec<Service>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Service>>;
    async fn create(&self, service: Service) -> StoreResult<Service>;
    async fn update(&self, service: Service) -> StoreResult<Service>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Persistence contract for appointments
#[async_trait]
pub trait AppointmentRepo: Send + Sync {
    async fn find(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Appointment>>;
    async fn create(&self, appointment: Appointment) -> StoreResult<Appointment>;
    async fn update(&self, appointment: Appointment) -> StoreResult<Appointment>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Persistence contract for orders
#[async_trait]
pub trait OrderRepo: Send + Sync {
    async fn find(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Order>>;

    /// Persist an order together with its commission, all or nothing.
    async fn create_with_commission(
        &self,
        order: Order,
        commission: Commission,
    ) -> StoreResult<(Order, Commission)>;

    /// Write fulfilment and payment fields. Never touches the forwarding latch.
    async fn update(&self, order: Order) -> StoreResult<Order>;

    /// Set the forwarding latch, compare-and-set on `forwarded_to_admin = false`.
    /// `Ok(None)` when the stored order was already forwarded.
    async fn forward(&self, order: Order) -> StoreResult<Option<Order>>;
}

/// Persistence contract for commissions; `order_id` is unique
#[async_trait]
pub trait CommissionRepo: Send + Sync {
    async fn find(&self, filter: &CommissionFilter) -> StoreResult<Vec<Commission>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Commission>>;
    async fn create(&self, commission: Commission) -> StoreResult<Commission>;

    /// Settle a commission, compare-and-set on `status = pending`.
    /// `Ok(None)` when the stored commission is already paid.
    async fn mark_paid(&self, commission: Commission) -> StoreResult<Option<Commission>>;
}
