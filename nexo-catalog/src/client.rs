use async_trait::async_trait;
use nexo_shared::ids::distinct;
use nexo_shared::{ChannelError, ProductId, RequestChannel, RpcReply, RpcRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::product::{retain_requested, CatalogRecord};

pub const VALIDATE_PRODUCTS: &str = "validate_products";

/// Catalog resolution errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("At least one product id is required")]
    EmptyRequest,

    #[error("Catalog request failed: {0}")]
    Transport(String),

    #[error("Catalog did not answer within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Remote(String),

    #[error("Unreadable catalog reply: {0}")]
    Decode(String),
}

impl From<ChannelError> for CatalogError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Timeout { timeout, .. } => CatalogError::Timeout(timeout),
            ChannelError::Codec(msg) => CatalogError::Decode(msg),
            ChannelError::Transport(msg) => CatalogError::Transport(msg),
        }
    }
}

/// Resolves product ids against the remote catalog.
///
/// The returned records hold at most one entry per distinct id. Unknown ids
/// are absent rather than reported.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn resolve(&self, product_ids: &[ProductId]) -> Result<Vec<CatalogRecord>, CatalogError>;
}

/// Catalog client speaking the `validate_products` request/reply contract.
pub struct RpcCatalogClient {
    channel: Arc<dyn RequestChannel>,
    subject: String,
    timeout: Duration,
}

impl RpcCatalogClient {
    pub fn new(channel: Arc<dyn RequestChannel>, subject: impl Into<String>, timeout: Duration) -> Self {
        Self {
            channel,
            subject: subject.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CatalogClient for RpcCatalogClient {
    async fn resolve(&self, product_ids: &[ProductId]) -> Result<Vec<CatalogRecord>, CatalogError> {
        let ids = distinct(product_ids);
        if ids.is_empty() {
            return Err(CatalogError::EmptyRequest);
        }

        let request = RpcRequest::new(VALIDATE_PRODUCTS, ids.clone());
        let payload = serde_json::to_value(&request).map_err(|e| CatalogError::Decode(e.to_string()))?;

        debug!("Resolving {} product(s) via {}", ids.len(), self.subject);
        let raw = self.channel.request(&self.subject, payload, self.timeout).await?;

        let reply: RpcReply =
            serde_json::from_value(raw).map_err(|e| CatalogError::Decode(e.to_string()))?;

        if let Some(message) = reply.error_message() {
            warn!("Catalog rejected request {}: {}", request.id, message);
            return Err(CatalogError::Remote(message));
        }

        let records: Vec<CatalogRecord> = match reply.response {
            Some(value) => serde_json::from_value(value).map_err(|e| CatalogError::Decode(e.to_string()))?,
            None => return Err(CatalogError::Decode("reply carries neither response nor err".to_string())),
        };

        Ok(retain_requested(records, &ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    /// Channel that records what was sent and answers with a canned reply.
    struct ScriptedChannel {
        reply: Result<Value, fn() -> ChannelError>,
        sent: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedChannel {
        fn replying(reply: Value) -> Self {
            Self { reply: Ok(reply), sent: Mutex::new(Vec::new()) }
        }

        fn failing(err: fn() -> ChannelError) -> Self {
            Self { reply: Err(err), sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl RequestChannel for ScriptedChannel {
        async fn request(&self, subject: &str, payload: Value, _timeout: Duration) -> Result<Value, ChannelError> {
            self.sent.lock().await.push((subject.to_string(), payload));
            match &self.reply {
                Ok(value) => Ok(value.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn client(channel: Arc<ScriptedChannel>) -> RpcCatalogClient {
        RpcCatalogClient::new(channel, VALIDATE_PRODUCTS, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_resolve_sends_distinct_ids_once() {
        let channel = Arc::new(ScriptedChannel::replying(json!({
            "id": null,
            "response": [{"id": "a", "name": "Widget", "price": 10}],
            "err": null,
            "isDisposed": true
        })));
        let ids = vec![ProductId::from("a"), ProductId::from("a"), ProductId::from("b")];

        let records = client(channel.clone()).resolve(&ids).await.unwrap();

        assert_eq!(records, vec![CatalogRecord::new("a", "Widget", Decimal::from(10))]);
        let sent = channel.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, VALIDATE_PRODUCTS);
        assert_eq!(sent[0].1["pattern"]["cmd"], VALIDATE_PRODUCTS);
        assert_eq!(sent[0].1["data"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_resolve_drops_duplicate_and_unrequested_records() {
        let channel = Arc::new(ScriptedChannel::replying(json!({
            "response": [
                {"id": "a", "name": "Widget", "price": 10},
                {"id": "a", "name": "Widget v2", "price": 12},
                {"id": "z", "name": "Stray", "price": 1}
            ]
        })));

        let records = client(channel).resolve(&[ProductId::from("a")]).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Widget");
    }

    #[tokio::test]
    async fn test_empty_request_never_hits_the_channel() {
        let channel = Arc::new(ScriptedChannel::replying(json!({"response": []})));

        let err = client(channel.clone()).resolve(&[]).await.unwrap_err();

        assert!(matches!(err, CatalogError::EmptyRequest));
        assert!(channel.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_remote_error_is_surfaced_with_message() {
        let channel = Arc::new(ScriptedChannel::replying(json!({
            "err": {"status": 400, "message": "Products not found: 99"},
            "isDisposed": true
        })));

        let err = client(channel).resolve(&[ProductId::from("99")]).await.unwrap_err();

        assert!(matches!(err, CatalogError::Remote(_)));
        assert_eq!(err.to_string(), "Products not found: 99");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_catalog_timeout() {
        let channel = Arc::new(ScriptedChannel::failing(|| ChannelError::Timeout {
            subject: VALIDATE_PRODUCTS.to_string(),
            timeout: Duration::from_millis(100),
        }));

        let err = client(channel).resolve(&[ProductId::from("a")]).await.unwrap_err();

        assert!(matches!(err, CatalogError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_a_decode_error() {
        let channel = Arc::new(ScriptedChannel::replying(json!({"response": {"not": "a list"}})));

        let err = client(channel).resolve(&[ProductId::from("a")]).await.unwrap_err();

        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
