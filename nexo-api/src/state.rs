use std::sync::Arc;
use nexo_core::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
}

impl AppState {
    pub fn new(orders: OrderService) -> Self {
        Self { orders: Arc::new(orders) }
    }
}
