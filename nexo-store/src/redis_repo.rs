use async_trait::async_trait;
use nexo_shared::{ChannelError, RequestChannel};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Frame pushed onto `rpc:<subject>`.
///
/// The responder pushes its reply onto `reply_to` and must expire that list
/// after `reply_ttl_ms`, so a reply that arrives after the caller gave up
/// does not outlive it.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestFrame {
    pub reply_to: String,
    pub reply_ttl_ms: u64,
    pub payload: Value,
}

impl RequestFrame {
    pub fn encode(reply_to: &str, reply_ttl: Duration, payload: Value) -> Result<String, ChannelError> {
        let frame = RequestFrame {
            reply_to: reply_to.to_string(),
            reply_ttl_ms: u64::try_from(reply_ttl.as_millis()).unwrap_or(u64::MAX),
            payload,
        };
        serde_json::to_string(&frame).map_err(|e| ChannelError::Codec(e.to_string()))
    }
}

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
    poll_interval: Duration,
    reply_ttl: Duration,
}

impl RedisClient {
    pub const DEFAULT_REPLY_TTL: Duration = Duration::from_secs(60);

    pub async fn new(connection_string: &str, poll_interval: Duration) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            poll_interval,
            reply_ttl: Self::DEFAULT_REPLY_TTL,
        })
    }

    pub fn with_reply_ttl(mut self, reply_ttl: Duration) -> Self {
        self.reply_ttl = reply_ttl;
        self
    }

    pub fn request_key(subject: &str) -> String {
        format!("rpc:{}", subject)
    }

    pub fn reply_key(correlation_id: Uuid) -> String {
        format!("rpc:reply:{}", correlation_id)
    }

    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Calls `pop` until it yields a reply or `deadline` passes.
///
/// `pop` is always tried at least once, so a reply already waiting is taken
/// even with a zero timeout.
async fn wait_for_reply<F, Fut, E>(mut pop: F, deadline: Instant, poll_interval: Duration) -> Result<Option<String>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<String>, E>>,
{
    loop {
        if let Some(raw) = pop().await? {
            return Ok(Some(raw));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Turns the outcome of a wait into the channel result.
fn decode_reply(raw: Option<String>, subject: &str, timeout: Duration) -> Result<Value, ChannelError> {
    match raw {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| ChannelError::Codec(e.to_string())),
        None => Err(ChannelError::Timeout {
            subject: subject.to_string(),
            timeout,
        }),
    }
}

fn transport(err: redis::RedisError) -> ChannelError {
    ChannelError::Transport(err.to_string())
}

#[async_trait]
impl RequestChannel for RedisClient {
    async fn request(
        &self,
        subject: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, ChannelError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(transport)?;

        let reply_key = Self::reply_key(Uuid::new_v4());
        let frame = RequestFrame::encode(&reply_key, self.reply_ttl, payload)?;

        let deadline = Instant::now() + timeout;
        conn.rpush::<_, _, ()>(Self::request_key(subject), frame).await.map_err(transport)?;
        debug!("Request queued on {}, awaiting {}", subject, reply_key);

        let pop = || {
            let mut conn = conn.clone();
            let key = reply_key.clone();
            async move { conn.lpop::<_, Option<String>>(key, None).await }
        };
        let reply = wait_for_reply(pop, deadline, self.poll_interval).await;

        // Replies pushed after this point expire on the responder's TTL.
        if let Err(e) = conn.del::<_, ()>(&reply_key).await {
            warn!("Failed to clear reply list {}: {}", reply_key, e);
        }

        let result = decode_reply(reply.map_err(transport)?, subject, timeout);
        if let Err(ChannelError::Timeout { .. }) = &result {
            warn!("No reply on {} within {:?}", subject, timeout);
        }
        result
    }
}
