use chrono::{DateTime, Utc};
use nexo_shared::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(OrderValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Order header as stored. Totals are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub total_items: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted order line. `price` is the catalog price at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Order with its lines in creation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    #[serde(rename = "orderItems")]
    pub items: Vec<OrderItem>,
}

/// Order line joined with the catalog display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(rename = "orderItems")]
    pub items: Vec<EnrichedOrderItem>,
}

/// Requested line in an incoming order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl OrderLineRequest {
    pub fn new(product_id: impl Into<ProductId>, quantity: i32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub items: Vec<OrderLineRequest>,
}

impl CreateOrder {
    pub fn new(items: Vec<OrderLineRequest>) -> Self {
        Self { items }
    }

    /// Reject orders that cannot be priced: no lines, or a non-positive quantity.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }

        if let Some(line) = self.items.iter().find(|line| line.quantity <= 0) {
            return Err(OrderValidationError::InvalidQuantity {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            });
        }

        Ok(())
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        nexo_shared::ids::distinct(self.items.iter().map(|line| &line.product_id))
    }
}

/// Everything the store needs to write an order and its lines in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub total_amount: Decimal,
    pub total_items: i64,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderValidationError {
    #[error("Order must contain at least one item")]
    NoItems,

    #[error("Quantity for product {product_id} must be positive, got {quantity}")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: i32,
    },

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [OrderStatus::Pending, OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_validate_rejects_empty_and_non_positive_quantity() {
        assert!(matches!(CreateOrder::new(vec![]).validate(), Err(OrderValidationError::NoItems)));

        let order = CreateOrder::new(vec![
            OrderLineRequest::new("a", 1),
            OrderLineRequest::new("b", 0),
        ]);
        let err = order.validate().unwrap_err();
        assert_eq!(err.to_string(), "Quantity for product b must be positive, got 0");

        assert!(CreateOrder::new(vec![OrderLineRequest::new("a", 3)]).validate().is_ok());
    }

    #[test]
    fn test_product_ids_are_distinct() {
        let order = CreateOrder::new(vec![
            OrderLineRequest::new("a", 1),
            OrderLineRequest::new("b", 2),
            OrderLineRequest::new("a", 4),
        ]);
        assert_eq!(order.product_ids(), vec![ProductId::from("a"), ProductId::from("b")]);
    }

    #[test]
    fn test_enriched_order_serializes_flat() {
        let now = Utc::now();
        let order = EnrichedOrder {
            order: Order {
                id: Uuid::new_v4(),
                status: OrderStatus::Pending,
                total_amount: Decimal::from(20),
                total_items: 2,
                created_at: now,
                updated_at: now,
            },
            items: vec![EnrichedOrderItem {
                product_id: ProductId::from("a"),
                quantity: 2,
                price: Decimal::from(10),
                name: "Widget".to_string(),
            }],
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["totalItems"], 2);
        assert_eq!(json["totalAmount"], "20");
        assert!(json["createdAt"].is_string());
        assert_eq!(json["orderItems"][0]["name"], "Widget");
        assert_eq!(json["orderItems"][0]["productId"], "a");
    }

    #[test]
    fn test_create_order_reads_camel_case_lines() {
        let order: CreateOrder =
            serde_json::from_str(r#"{"items": [{"productId": 7, "quantity": 2}]}"#).unwrap();

        assert_eq!(order.items, vec![OrderLineRequest::new("7", 2)]);
    }
}
