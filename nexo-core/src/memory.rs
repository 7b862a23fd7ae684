use async_trait::async_trait;
use chrono::{Duration, Utc};
use nexo_order::{NewOrder, Order, OrderStatus, OrderWithItems};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repository::{OrderRepository, StoreError};

/// Order store kept in process memory.
///
/// Counts write attempts so callers can verify that a failed workflow never
/// reached the store.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<OrderWithItems>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every following `create_order` fails.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Insert `count` orders with the given status, one second apart.
    pub async fn seed(&self, count: usize, status: OrderStatus) -> Vec<Uuid> {
        let mut orders = self.orders.write().await;
        let base = Utc::now();
        (0..count)
            .map(|n| {
                let at = base + Duration::seconds(n as i64);
                let order = Order {
                    id: Uuid::new_v4(),
                    status,
                    total_amount: Decimal::ZERO,
                    total_items: 0,
                    created_at: at,
                    updated_at: at,
                };
                let id = order.id;
                orders.push(OrderWithItems { order, items: Vec::new() });
                id
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderWithItems, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("order store is unavailable".into());
        }

        let now = Utc::now();
        let stored = OrderWithItems {
            order: Order {
                id: Uuid::new_v4(),
                status: OrderStatus::Pending,
                total_amount: order.total_amount,
                total_items: order.total_items,
                created_at: now,
                updated_at: now,
            },
            items: order.items.clone(),
        };

        self.orders.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<OrderWithItems>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.order.id == id).cloned())
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<i64, StoreError> {
        let orders = self.orders.read().await;
        let count = orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.order.status == s))
            .count();
        Ok(count as i64)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.order.status == s))
            .map(|o| o.order.clone())
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(matching
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(take.max(0) as usize)
            .collect())
    }
}
