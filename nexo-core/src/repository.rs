use async_trait::async_trait;
use nexo_order::{NewOrder, Order, OrderStatus, OrderWithItems};
use uuid::Uuid;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Write the order header and all of its lines atomically.
    ///
    /// Either the whole order becomes visible or nothing does. New orders
    /// start in `PENDING`.
    async fn create_order(&self, order: &NewOrder) -> Result<OrderWithItems, StoreError>;

    /// Order with its lines in creation order.
    async fn find_order(&self, id: Uuid) -> Result<Option<OrderWithItems>, StoreError>;

    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<i64, StoreError>;

    /// Order headers (no lines), oldest first.
    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Order>, StoreError>;
}
