//! In-memory record store
//!
//! Backs tests and local runs. All tables sit behind one lock so that the
//! order + commission pair is written in a single critical section, and the
//! unique `order_id` rule on commissions is enforced like the real store does.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    models::{Appointment, Commission, CommissionStatus, Order, Service},
    store::{
        AppointmentFilter, AppointmentRepo, CommissionFilter, CommissionRepo, OrderFilter,
        OrderRepo, ServiceRepo, StoreError, StoreResult,
    },
};

#[derive(Debug, Default)]
struct Tables {
    services: HashMap<Uuid, Service>,
    appointments: HashMap<Uuid, Appointment>,
    orders: HashMap<Uuid, Order>,
    commissions: HashMap<Uuid, Commission>,
}

impl Tables {
    fn insert_commission(&mut self, commission: Commission) -> StoreResult<Commission> {
        if self
            .commissions
            .values()
            .any(|c| c.order_id == commission.order_id)
        {
            return Err(StoreError::Conflict(format!(
                "commission already exists for order {}",
                commission.order_id
            )));
        }
        self.commissions.insert(commission.id, commission.clone());
        Ok(commission)
    }
}

/// Shared in-memory store; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T: Clone>(
    table: &mut HashMap<Uuid, T>,
    entity: &'static str,
    id: Uuid,
    record: T,
) -> StoreResult<T> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = record.clone();
            Ok(record)
        }
        None => Err(StoreError::NotFound { entity, id }),
    }
}

#[async_trait]
impl ServiceRepo for InMemoryStore {
    async fn find_by_salon(&self, salon_id: Uuid) -> StoreResult<Vec<Service>> {
        let tables = self.tables.lock().await;
        let mut services: Vec<Service> = tables
            .services
            .values()
            .filter(|s| s.salon_id == salon_id)
            .cloned()
            .collect();
        services.sort_by_key(|s| s.created_at);
        Ok(services)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Service>> {
        Ok(self.tables.lock().await.services.get(&id).cloned())
    }

    async fn create(&self, service: Service) -> StoreResult<Service> {
        let mut tables = self.tables.lock().await;
        tables.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update(&self, service: Service) -> StoreResult<Service> {
        let mut tables = self.tables.lock().await;
        replace(&mut tables.services, "Service", service.id, service)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .services
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                entity: "Service",
                id,
            })
    }
}

#[async_trait]
impl AppointmentRepo for InMemoryStore {
    async fn find(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.lock().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.start_time);
        Ok(appointments)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Ok(self.tables.lock().await.appointments.get(&id).cloned())
    }

    async fn create(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.lock().await;
        tables
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.lock().await;
        replace(
            &mut tables.appointments,
            "Appointment",
            appointment.id,
            appointment,
        )
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .appointments
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                entity: "Appointment",
                id,
            })
    }
}

#[async_trait]
impl OrderRepo for InMemoryStore {
    async fn find(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn create_with_commission(
        &self,
        order: Order,
        commission: Commission,
    ) -> StoreResult<(Order, Commission)> {
        let mut tables = self.tables.lock().await;
        if tables.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        // commission first: a conflict must leave no order behind
        let commission = tables.insert_commission(commission)?;
        tables.orders.insert(order.id, order.clone());
        Ok((order, commission))
    }

    async fn update(&self, mut order: Order) -> StoreResult<Order> {
        let mut tables = self.tables.lock().await;
        let stored = tables.orders.get(&order.id).ok_or(StoreError::NotFound {
            entity: "Order",
            id: order.id,
        })?;
        order.forwarded_to_admin = stored.forwarded_to_admin;
        order.forwarded_at = stored.forwarded_at;
        replace(&mut tables.orders, "Order", order.id, order)
    }

    async fn forward(&self, order: Order) -> StoreResult<Option<Order>> {
        let mut tables = self.tables.lock().await;
        match tables.orders.get_mut(&order.id) {
            Some(stored) if stored.forwarded_to_admin => Ok(None),
            Some(stored) => {
                *stored = order.clone();
                Ok(Some(order))
            }
            None => Err(StoreError::NotFound {
                entity: "Order",
                id: order.id,
            }),
        }
    }
}

#[async_trait]
impl CommissionRepo for InMemoryStore {
    async fn find(&self, filter: &CommissionFilter) -> StoreResult<Vec<Commission>> {
        let tables = self.tables.lock().await;
        let mut commissions: Vec<Commission> = tables
            .commissions
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        commissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(commissions)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Commission>> {
        Ok(self.tables.lock().await.commissions.get(&id).cloned())
    }

    async fn create(&self, commission: Commission) -> StoreResult<Commission> {
        self.tables.lock().await.insert_commission(commission)
    }

    async fn mark_paid(&self, commission: Commission) -> StoreResult<Option<Commission>> {
        let mut tables = self.tables.lock().await;
        match tables.commissions.get_mut(&commission.id) {
            Some(stored) if stored.status != CommissionStatus::Pending => Ok(None),
            Some(stored) => {
                *stored = commission.clone();
                Ok(Some(commission))
            }
            None => Err(StoreError::NotFound {
                entity: "Commission",
                id: commission.id,
            }),
        }
    }
}
