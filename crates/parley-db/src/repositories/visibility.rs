//! PostgreSQL implementation of VisibilityRepository
//!
//! Deletion markers are a set-membership relation on
//! (user, conversation): upsert and delete are both idempotent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use parley_core::{RepoResult, VisibilityRepository};

use super::error::map_db_error;

/// PostgreSQL implementation of VisibilityRepository
#[derive(Clone)]
pub struct PgVisibilityRepository {
    pool: PgPool,
}

impl PgVisibilityRepository {
    /// Create a new PgVisibilityRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisibilityRepository for PgVisibilityRepository {
    #[instrument(skip(self))]
    async fn is_deleted_for(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM deleted_conversations
                WHERE conversation_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn mark_deleted(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO deleted_conversations (user_id, conversation_id, deleted_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, conversation_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(conversation_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn restore(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        sqlx::query(
            r#"
            DELETE FROM deleted_conversations
            WHERE conversation_id = $1 AND user_id = $2
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn deleted_user_ids(&self, conversation_id: Uuid) -> RepoResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id FROM deleted_conversations
            WHERE conversation_id = $1
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids)
    }
}
