pub mod repository;
pub mod pagination;
pub mod memory;
pub mod service;

use uuid::Uuid;

pub use memory::InMemoryOrderRepository;
pub use pagination::{OrderFilter, Page, PageMeta, PageRequest};
pub use repository::{OrderRepository, StoreError};
pub use service::{OrderRules, OrderService};

/// Failures surfaced by the order workflow to its callers.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Order with id {0} not found")]
    NotFound(Uuid),

    #[error("Product catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, OrderError>;
