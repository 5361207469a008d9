//! Order repository

use async_trait::async_trait;
use domain::{
    StoreError, StoreResult,
    models::{Commission, Order, OrderItem, ShippingAddress},
    store::{OrderFilter, OrderRepo},
};
use sqlx::{PgPool, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use super::{column, commission, parse_column, store_error};

const COLUMNS: &str = "id, customer_id, salon_id, items, total_amount, commission_amount, status, \
                       payment_status, shipping_address, tracking_number, notes, \
                       forwarded_to_admin, forwarded_at, created_at, updated_at";

/// Order repository for database operations
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn from_row(row: &PgRow) -> StoreResult<Order> {
    let status: String = column(row, "status")?;
    let payment_status: String = column(row, "payment_status")?;
    let Json(items): Json<Vec<OrderItem>> = column(row, "items")?;
    let Json(shipping_address): Json<ShippingAddress> = column(row, "shipping_address")?;

    Ok(Order {
        id: column(row, "id")?,
        customer_id: column(row, "customer_id")?,
        salon_id: column(row, "salon_id")?,
        items,
        total_amount: column(row, "total_amount")?,
        commission_amount: column(row, "commission_amount")?,
        status: parse_column(&status)?,
        payment_status: parse_column(&payment_status)?,
        shipping_address,
        tracking_number: column(row, "tracking_number")?,
        notes: column(row, "notes")?,
        forwarded_to_admin: column(row, "forwarded_to_admin")?,
        forwarded_at: column(row, "forwarded_at")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

#[async_trait]
impl OrderRepo for PgOrderRepository {
    async fn find(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM orders
            WHERE ($1::uuid IS NULL OR salon_id = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.salon_id)
        .bind(filter.customer_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(from_row).transpose()
    }

    async fn create_with_commission(
        &self,
        order: Order,
        commission: Commission,
    ) -> StoreResult<(Order, Commission)> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (id, customer_id, salon_id, items, total_amount, commission_amount,
                                status, payment_status, shipping_address, tracking_number, notes,
                                forwarded_to_admin, forwarded_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(order.customer_id)
        .bind(order.salon_id)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(order.commission_amount)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(Json(&order.shipping_address))
        .bind(&order.tracking_number)
        .bind(&order.notes)
        .bind(order.forwarded_to_admin)
        .bind(order.forwarded_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error)?;
        let order = from_row(&row)?;

        // Dropping the transaction on error rolls the order back too
        let commission = commission::insert(&mut tx, &commission).await?;

        tx.commit().await.map_err(store_error)?;
        info!("Order {} persisted with commission {}", order.id, commission.id);

        Ok((order, commission))
    }

    async fn update(&self, order: Order) -> StoreResult<Order> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET status = $2, payment_status = $3, tracking_number = $4, notes = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(&order.tracking_number)
        .bind(&order.notes)
        .bind(order.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?
        .ok_or(StoreError::NotFound {
            entity: "Order",
            id: order.id,
        })?;

        from_row(&row)
    }

    async fn forward(&self, order: Order) -> StoreResult<Option<Order>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET status = $2, forwarded_to_admin = TRUE, forwarded_at = $3, updated_at = $4
            WHERE id = $1 AND forwarded_to_admin = FALSE
            RETURNING {COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.forwarded_at)
        .bind(order.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.as_ref().map(from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::PgCommissionRepository;
    use chrono::Utc;
    use common::database::{DatabaseConfig, init_pool};
    use domain::{
        DomainError, Ledger, Principal,
        models::{NewOrder, OrderStatus, PaymentStatus},
        store::CommissionRepo,
    };
    use std::sync::Arc;

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL"]
    async fn test_order_and_commission_round_trip() -> anyhow::Result<()> {
        let pool = init_pool(&DatabaseConfig::from_env()?).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let orders = Arc::new(PgOrderRepository::new(pool.clone()));
        let commissions = Arc::new(PgCommissionRepository::new(pool));
        let ledger = Ledger::new(orders.clone(), commissions.clone(), 0.05);

        let customer = Principal::customer(Uuid::new_v4());
        let salon = Uuid::new_v4();
        let order = ledger
            .create_order(
                Some(&customer),
                NewOrder {
                    customer_id: customer.id,
                    salon_id: salon,
                    items: vec![OrderItem {
                        product_id: Uuid::new_v4(),
                        quantity: 3,
                        price: 10.0,
                        discount: Some(1.5),
                    }],
                    total_amount: 28.0,
                    shipping_address: ShippingAddress {
                        street: "1 Main St".to_string(),
                        city: "Springfield".to_string(),
                        state: "IL".to_string(),
                        zip_code: "62701".to_string(),
                        country: "USA".to_string(),
                    },
                    payment_status: Some(PaymentStatus::Paid),
                    notes: None,
                },
            )
            .await?;

        let stored = orders.find_by_id(order.id).await?.expect("order persisted");
        assert_eq!(stored.items, order.items);
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.commission_amount, 1.4);

        let listed = commissions
            .find(&domain::store::CommissionFilter {
                salon_id: Some(salon),
                status: None,
            })
            .await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].order_id, order.id);

        // UNIQUE (order_id) surfaces as a conflict
        assert!(matches!(
            ledger.accrue_commission(&order).await,
            Err(DomainError::Conflict(_))
        ));

        let forwarded = Order {
            forwarded_to_admin: true,
            forwarded_at: Some(Utc::now()),
            ..stored.clone()
        };
        assert!(orders.forward(forwarded.clone()).await?.is_some());
        assert!(orders.forward(forwarded).await?.is_none());

        let commission = listed[0].clone();
        let paid = Commission {
            status: domain::models::CommissionStatus::Paid,
            payment_date: Some(Utc::now()),
            ..commission
        };
        assert!(commissions.mark_paid(paid.clone()).await?.is_some());
        assert!(commissions.mark_paid(paid).await?.is_none());

        let missing = Order {
            id: Uuid::new_v4(),
            updated_at: Utc::now(),
            ..stored
        };
        assert!(matches!(
            orders.update(missing).await,
            Err(StoreError::NotFound { .. })
        ));

        Ok(())
    }
}
