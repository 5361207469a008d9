//! Order and commission ledger
//!
//! Every order accrues exactly one commission, written in the same store
//! call as the order itself. The commission amount is fixed when the order
//! is created and never recomputed afterwards.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{DomainError, DomainResult},
    guard::{self, ResourceOwner, Scope},
    models::{
        Commission, CommissionStatus, NewOrder, Order, OrderStatus, PaymentStatus, UpdateOrder,
    },
    principal::{Principal, Role},
    store::{CommissionFilter, CommissionRepo, OrderFilter, OrderRepo},
};

/// Platform share of an order's total
pub const DEFAULT_COMMISSION_RATE: f64 = 0.05;

/// `round(total * rate, 2)`
pub fn commission_for(total_amount: f64, rate: f64) -> f64 {
    (total_amount * rate * 100.0).round() / 100.0
}

/// Caller filters for listing orders
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub salon_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// Caller filters for listing commissions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuery {
    pub salon_id: Option<Uuid>,
    pub status: Option<CommissionStatus>,
}

/// Order and commission operations
#[derive(Clone)]
pub struct Ledger {
    orders: Arc<dyn OrderRepo>,
    commissions: Arc<dyn CommissionRepo>,
    rate: f64,
}

fn owner_of(order: &Order) -> ResourceOwner {
    ResourceOwner::customer(order.salon_id, order.customer_id)
}

impl Ledger {
    pub fn new(orders: Arc<dyn OrderRepo>, commissions: Arc<dyn CommissionRepo>, rate: f64) -> Self {
        Self {
            orders,
            commissions,
            rate,
        }
    }

    pub fn commission_rate(&self) -> f64 {
        self.rate
    }

    /// Create an order and its pending commission as one unit
    pub async fn create_order(&self, principal: Option<&Principal>, fields: NewOrder) -> DomainResult<Order> {
        guard::authorize(
            principal,
            ResourceOwner::customer(fields.salon_id, fields.customer_id),
        )?;
        validate_order(&fields, self.rate)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: fields.customer_id,
            salon_id: fields.salon_id,
            items: fields.items,
            total_amount: fields.total_amount,
            commission_amount: commission_for(fields.total_amount, self.rate),
            status: OrderStatus::Pending,
            payment_status: fields.payment_status.unwrap_or(PaymentStatus::Pending),
            shipping_address: fields.shipping_address,
            tracking_number: None,
            notes: fields.notes,
            forwarded_to_admin: false,
            forwarded_at: None,
            created_at: now,
            updated_at: now,
        };
        let commission = Commission::pending_for(&order, now);

        let (order, commission) = self
            .orders
            .create_with_commission(order, commission)
            .await
            .inspect_err(|e| warn!("Failed to persist order with commission: {}", e))?;

        info!(
            order = %order.id,
            salon = %order.salon_id,
            total = order.total_amount,
            commission = %commission.id,
            amount = commission.amount,
            "order created"
        );
        Ok(order)
    }

    /// Record the commission of an existing order. Fails with `Conflict`
    /// when the order already has one.
    pub async fn accrue_commission(&self, order: &Order) -> DomainResult<Commission> {
        let commission = self
            .commissions
            .create(Commission::pending_for(order, Utc::now()))
            .await?;
        info!(commission = %commission.id, order = %order.id, "commission accrued");
        Ok(commission)
    }

    pub async fn get_order(&self, principal: Option<&Principal>, id: Uuid) -> DomainResult<Order> {
        guard::authenticate(principal)?;
        let order = self.load_order(id).await?;
        guard::authorize(principal, owner_of(&order))?;
        Ok(order)
    }

    /// Fulfilment and payment bookkeeping, kept to the salon and the platform
    pub async fn update_order(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
        patch: UpdateOrder,
    ) -> DomainResult<Order> {
        let caller = guard::authenticate(principal)?;
        if caller.role == Role::Customer {
            warn!(principal = %caller.id, order = %id, "customer attempted order update");
            return Err(DomainError::Forbidden(
                "customers cannot update orders".to_string(),
            ));
        }
        let mut order = self.load_order(id).await?;
        guard::authorize(principal, owner_of(&order))?;

        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            order.payment_status = payment_status;
        }
        if patch.tracking_number.is_some() {
            order.tracking_number = patch.tracking_number;
        }
        if patch.notes.is_some() {
            order.notes = patch.notes;
        }
        order.updated_at = Utc::now();

        let order = self.orders.update(order).await?;
        info!(order = %order.id, status = %order.status, payment = %order.payment_status, "order updated");
        Ok(order)
    }

    /// Escalate an order to platform review. One-way: a second call fails.
    pub async fn forward_to_admin(&self, principal: Option<&Principal>, id: Uuid) -> DomainResult<Order> {
        guard::authenticate(principal)?;
        let mut order = self.load_order(id).await?;
        guard::authorize_salon_admin(principal, order.salon_id)?;

        if order.forwarded_to_admin {
            return Err(DomainError::AlreadyForwarded(order.id));
        }

        let now = Utc::now();
        order.forwarded_to_admin = true;
        order.forwarded_at = Some(now);
        if order.status == OrderStatus::Pending {
            order.status = OrderStatus::Processing;
        }
        order.updated_at = now;

        // A concurrent forward may have won since the read above
        let order = self.orders.forward(order).await?.ok_or_else(|| {
            warn!(order = %id, "order forwarded concurrently");
            DomainError::AlreadyForwarded(id)
        })?;
        info!(order = %order.id, status = %order.status, "order forwarded to admin");
        Ok(order)
    }

    /// Orders visible to the principal, newest first
    pub async fn list_orders(&self, principal: Option<&Principal>, query: &OrderQuery) -> DomainResult<Vec<Order>> {
        let principal = guard::authenticate(principal)?;
        let Some(scope) = Scope::for_principal(principal)?.narrow_salon(query.salon_id) else {
            return Ok(Vec::new());
        };

        let filter = OrderFilter {
            salon_id: scope.salon_id,
            customer_id: scope.customer_id,
            status: query.status,
        };
        let mut orders = self.orders.find(&filter).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Commissions visible to the principal, newest first
    pub async fn list_commissions(
        &self,
        principal: Option<&Principal>,
        query: &CommissionQuery,
    ) -> DomainResult<Vec<Commission>> {
        let principal = guard::authenticate(principal)?;
        if principal.role == Role::Customer {
            return Err(DomainError::Forbidden(
                "customers cannot view commissions".to_string(),
            ));
        }
        let Some(scope) = Scope::for_principal(principal)?.narrow_salon(query.salon_id) else {
            return Ok(Vec::new());
        };

        let filter = CommissionFilter {
            salon_id: scope.salon_id,
            status: query.status,
        };
        let mut commissions = self.commissions.find(&filter).await?;
        commissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(commissions)
    }

    /// Settle a commission. Paying twice is an invalid transition.
    pub async fn mark_commission_paid(&self, id: Uuid) -> DomainResult<Commission> {
        let mut commission = self
            .commissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Commission", id))?;

        if commission.status == CommissionStatus::Paid {
            return Err(DomainError::invalid_transition(
                CommissionStatus::Paid,
                CommissionStatus::Paid,
            ));
        }

        let now = Utc::now();
        commission.status = CommissionStatus::Paid;
        commission.payment_date = Some(now);
        commission.updated_at = now;

        let commission = self.commissions.mark_paid(commission).await?.ok_or_else(|| {
            warn!(commission = %id, "commission paid concurrently");
            DomainError::invalid_transition(CommissionStatus::Paid, CommissionStatus::Paid)
        })?;
        info!(commission = %commission.id, amount = commission.amount, "commission paid");
        Ok(commission)
    }

    async fn load_order(&self, id: Uuid) -> DomainResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }
}

fn validate_order(fields: &NewOrder, rate: f64) -> DomainResult<()> {
    if fields.items.is_empty() {
        return Err(DomainError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }
    for item in &fields.items {
        if item.quantity < 1 {
            return Err(DomainError::Validation(format!(
                "Quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(DomainError::Validation(format!(
                "Price for product {} must not be negative",
                item.product_id
            )));
        }
        if item.discount.is_some_and(|d| !d.is_finite() || d < 0.0) {
            return Err(DomainError::Validation(format!(
                "Discount for product {} must not be negative",
                item.product_id
            )));
        }
    }
    if !fields.total_amount.is_finite() || fields.total_amount < 0.0 {
        return Err(DomainError::Validation(
            "Total amount must not be negative".to_string(),
        ));
    }
    if !commission_for(fields.total_amount, rate).is_finite() {
        return Err(DomainError::Validation(
            "Total amount is too large".to_string(),
        ));
    }
    Ok(())
}
