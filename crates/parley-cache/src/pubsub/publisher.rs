//! Redis Pub/Sub publisher.
//!
//! Implements the domain's `EventTransport` port: serialized domain events
//! are published to logical channels for distribution to realtime clients.

use async_trait::async_trait;
use redis::AsyncCommands;

use parley_core::{DomainError, DomainEvent, EventTransport, RepoResult};

use crate::pool::RedisPool;

/// Redis-backed event publisher
#[derive(Clone)]
pub struct RedisPublisher {
    pool: RedisPool,
}

impl RedisPublisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventTransport for RedisPublisher {
    async fn publish(&self, channel: &str, event: &DomainEvent) -> RepoResult<()> {
        let payload =
            serde_json::to_string(event).map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;

        let receivers: u32 = conn
            .publish(channel, &payload)
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;

        tracing::debug!(
            channel = %channel,
            event = %event.name(),
            receivers = receivers,
            "Published event"
        );

        Ok(())
    }
}

impl std::fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPublisher").finish()
    }
}
