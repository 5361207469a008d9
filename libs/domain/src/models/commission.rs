//! Platform commission owed on an order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Order, status_enum};

status_enum!(CommissionStatus {
    Pending => "pending",
    Paid => "paid",
});

/// Commission entity; exactly one per order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub order_id: Uuid,
    pub amount: f64,
    pub status: CommissionStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Commission {
    /// Fresh pending commission mirroring the order's commission amount
    pub fn pending_for(order: &Order, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            salon_id: order.salon_id,
            order_id: order.id,
            amount: order.commission_amount,
            status: CommissionStatus::Pending,
            payment_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}
