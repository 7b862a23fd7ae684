use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexo_core::repository::{OrderRepository, StoreError};
use nexo_order::{NewOrder, Order, OrderItem, OrderStatus, OrderWithItems};
use nexo_shared::ProductId;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    status: String,
    total_amount: Decimal,
    total_items: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            status: row.status.parse::<OrderStatus>()?,
            total_amount: row.total_amount,
            total_items: row.total_items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_id: String,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            product_id: ProductId::from(row.product_id),
            quantity: row.quantity,
            price: row.price,
        }
    }
}

const ORDER_COLUMNS: &str = "id, status, total_amount, total_items, created_at, updated_at";

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderWithItems, StoreError> {
        let order_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO orders (id, status, total_amount, total_items)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(order.total_amount)
        .bind(order.total_items)
        .fetch_one(&mut *tx)
        .await?;

        for (line_no, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, line_no, product_id, quantity, price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(line_no as i32)
            .bind(item.product_id.as_str())
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!("Persisted order {} with {} line(s)", order_id, order.items.len());

        Ok(OrderWithItems {
            order: Order::try_from(row)?,
            items: order.items.clone(),
        })
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<OrderWithItems>, StoreError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT product_id, quantity, price FROM order_items WHERE order_id = $1 ORDER BY line_no",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderWithItems {
            order: Order::try_from(row)?,
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::TEXT IS NULL OR status = $1)")
                .bind(status.map(|s| s.as_str()))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at, id
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(skip)
        .bind(take)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
