//! User presence storage in Redis.
//!
//! Implements the domain's `PresenceStore` port. Each online user holds one
//! key with a TTL; heartbeats refresh it, so a client that vanishes without
//! a clean disconnect goes offline when the TTL lapses.

use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use parley_core::{DomainError, PresenceStore, RepoResult};

use crate::pool::RedisPool;

/// Key prefix for user presence
const PRESENCE_PREFIX: &str = "presence:user:";

/// Presence TTL (5 minutes, refreshed by heartbeat)
pub const PRESENCE_TTL_SECS: u64 = 300;

/// Redis-backed presence cache
#[derive(Clone)]
pub struct RedisPresenceStore {
    pool: RedisPool,
}

impl RedisPresenceStore {
    /// Create a new presence store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(user_id: Uuid) -> String {
        format!("{PRESENCE_PREFIX}{user_id}")
    }

    async fn conn(&self) -> RepoResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))
    }
}

#[async_trait]
impl PresenceStore for RedisPresenceStore {
    async fn set_online(&self, user_id: Uuid) -> RepoResult<()> {
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(Self::key(user_id), 1, PRESENCE_TTL_SECS)
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;
        Ok(())
    }

    async fn set_offline(&self, user_id: Uuid) -> RepoResult<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(Self::key(user_id))
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;
        Ok(())
    }

    async fn refresh(&self, user_id: Uuid) -> RepoResult<()> {
        let mut conn = self.conn().await?;
        // EXPIRE on a missing key is a no-op, so a heartbeat from a user the
        // cache already dropped does not resurrect them.
        conn.expire::<_, i64>(Self::key(user_id), PRESENCE_TTL_SECS as i64)
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;
        Ok(())
    }

    async fn is_online(&self, user_id: Uuid) -> RepoResult<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn
            .exists(Self::key(user_id))
            .await
            .map_err(|e| DomainError::Cache(e.to_string()))?;
        Ok(exists)
    }
}

impl std::fmt::Debug for RedisPresenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPresenceStore").finish()
    }
}
