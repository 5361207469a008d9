//! Product orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status_enum;

status_enum!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

status_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Refunded => "refunded",
});

/// One product line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "product")]
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: f64,
    pub discount: Option<f64>,
}

fn default_country() -> String {
    "USA".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub salon_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    /// Fixed at creation, never recomputed
    pub commission_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub forwarded_to_admin: bool,
    pub forwarded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New order creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(alias = "customer")]
    pub customer_id: Uuid,
    #[serde(alias = "salon")]
    pub salon_id: Uuid,
    #[serde(alias = "products")]
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub shipping_address: ShippingAddress,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

/// Order update payload; `commission_amount` and the forwarding latch are not patchable
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_country_defaults_to_usa() {
        let address: ShippingAddress = serde_json::from_value(serde_json::json!({
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "zipCode": "62701"
        }))
        .unwrap();
        assert_eq!(address.country, "USA");
    }

    #[test]
    fn statuses_use_lowercase_names() {
        assert_eq!("processing".parse::<OrderStatus>(), Ok(OrderStatus::Processing));
        assert_eq!(PaymentStatus::Refunded.to_string(), "refunded");
        assert!("lost".parse::<OrderStatus>().is_err());
    }
}
