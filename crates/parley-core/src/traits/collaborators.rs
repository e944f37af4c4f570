//! Collaborator contracts - interfaces owned here, implemented elsewhere
//!
//! The transport owns sockets and subscriptions; the domain only publishes.
//! Delivery is at-most-once per subscribed connection: there is no outbox or
//! replay queue, and clients reconcile via idempotent id-based upsert.

use async_trait::async_trait;
use uuid::Uuid;

use crate::events::DomainEvent;
use crate::traits::repositories::RepoResult;

/// Transport/Channel collaborator: publishes a domain event to one logical
/// channel. Failures are surfaced so the caller can log them, but they never
/// roll back the state mutation that produced the event.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn publish(&self, channel: &str, event: &DomainEvent) -> RepoResult<()>;
}

/// Process-wide presence cache keyed by user id
///
/// Entries carry a TTL refreshed by heartbeats, so presence self-invalidates
/// when a client disappears without a clean disconnect.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Mark a user online (sets the TTL)
    async fn set_online(&self, user_id: Uuid) -> RepoResult<()>;

    /// Mark a user offline (drops the entry immediately)
    async fn set_offline(&self, user_id: Uuid) -> RepoResult<()>;

    /// Heartbeat: refresh the TTL of an online entry
    async fn refresh(&self, user_id: Uuid) -> RepoResult<()>;

    /// Check cached presence
    async fn is_online(&self, user_id: Uuid) -> RepoResult<bool>;
}
