pub mod product;
pub mod client;
pub mod mock;

pub use product::{find_record, CatalogRecord};
pub use client::{CatalogClient, CatalogError, RpcCatalogClient, VALIDATE_PRODUCTS};
pub use mock::MockCatalogClient;
