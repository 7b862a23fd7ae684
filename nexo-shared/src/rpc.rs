use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Message pattern used to route a request to its remote handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub cmd: String,
}

/// Outbound request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest<T> {
    pub pattern: Pattern,
    pub data: T,
    pub id: Uuid,
}

impl<T> RpcRequest<T> {
    pub fn new(cmd: &str, data: T) -> Self {
        Self {
            pattern: Pattern { cmd: cmd.to_string() },
            data,
            id: Uuid::new_v4(),
        }
    }
}

/// Reply envelope written by the remote handler.
///
/// Exactly one of `response` / `err` is expected to be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcReply {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default, rename = "isDisposed")]
    pub is_disposed: bool,
}

impl RpcReply {
    pub fn ok(id: Uuid, response: Value) -> Self {
        Self { id: Some(id), response: Some(response), err: None, is_disposed: true }
    }

    pub fn error(id: Uuid, err: Value) -> Self {
        Self { id: Some(id), response: None, err: Some(err), is_disposed: true }
    }

    /// Human readable text of the remote error, if any.
    ///
    /// Remote handlers send either a bare string or an object with a
    /// `message` field.
    pub fn error_message(&self) -> Option<String> {
        self.err.as_ref().map(|err| match err {
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("message") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => err.to_string(),
            },
            other => other.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("No reply on {subject} within {timeout:?}")]
    Timeout { subject: String, timeout: Duration },

    #[error("Malformed frame: {0}")]
    Codec(String),
}

/// Request/response channel to a remote service.
///
/// Implementations deliver one request and hand back the single reply
/// observed for it. Callers suspend until that reply arrives or `timeout`
/// elapses.
#[async_trait]
pub trait RequestChannel: Send + Sync {
    async fn request(
        &self,
        subject: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope_shape() {
        let req = RpcRequest::new("validate_products", vec!["a", "b"]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["pattern"]["cmd"], "validate_products");
        assert_eq!(json["data"], serde_json::json!(["a", "b"]));
        assert!(json["id"].is_string());
    }

    #[test]
    fn test_error_message_from_object_and_string() {
        let id = Uuid::new_v4();
        let reply = RpcReply::error(id, serde_json::json!({"status": 400, "message": "bad ids"}));
        assert_eq!(reply.error_message().as_deref(), Some("bad ids"));

        let reply = RpcReply::error(id, serde_json::json!("catalog down"));
        assert_eq!(reply.error_message().as_deref(), Some("catalog down"));

        let reply = RpcReply::ok(id, serde_json::json!([]));
        assert!(reply.error_message().is_none());
    }

    #[test]
    fn test_reply_decodes_wire_field_names() {
        let reply: RpcReply = serde_json::from_str(
            r#"{"id": null, "response": [{"id": 1}], "err": null, "isDisposed": true}"#,
        )
        .unwrap();
        assert!(reply.is_disposed);
        assert!(reply.response.is_some());
        assert!(reply.err.is_none());
    }
}
