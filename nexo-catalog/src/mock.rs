use async_trait::async_trait;
use nexo_shared::ids::distinct;
use nexo_shared::ProductId;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::client::{CatalogClient, CatalogError};
use crate::product::{retain_requested, CatalogRecord};

/// In-process catalog for local runs and tests.
///
/// Honours the same contract as the remote client: distinct ids, at most one
/// record per id, unknown ids simply absent.
pub struct MockCatalogClient {
    records: RwLock<Vec<CatalogRecord>>,
    failure: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl MockCatalogClient {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            failure: RwLock::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the catalog contents (e.g. a product got renamed remotely).
    pub async fn set_records(&self, records: Vec<CatalogRecord>) {
        *self.records.write().await = records;
    }

    /// Make every following call fail with `message`.
    pub async fn fail_with(&self, message: &str) {
        *self.failure.write().await = Some(message.to_string());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn resolve(&self, product_ids: &[ProductId]) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.read().await.clone() {
            return Err(CatalogError::Transport(message));
        }

        let ids = distinct(product_ids);
        if ids.is_empty() {
            return Err(CatalogError::EmptyRequest);
        }

        let records = self.records.read().await.clone();
        Ok(retain_requested(records, &ids))
    }
}
