pub mod models;
pub mod aggregation;

pub use models::{
    CreateOrder, EnrichedOrder, EnrichedOrderItem, NewOrder, Order, OrderItem, OrderLineRequest,
    OrderStatus, OrderValidationError, OrderWithItems,
};
pub use aggregation::{aggregate, enrich, AggregationError, LinePrice, OrderAggregate, PricedLine, UNKNOWN_PRODUCT};
