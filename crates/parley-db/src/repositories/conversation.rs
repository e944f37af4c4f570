//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use parley_core::{Conversation, ConversationRepository, RepoResult};

use crate::models::ConversationModel;

use super::error::map_db_error;

/// Select a non-group conversation whose participant set is exactly the two
/// given users - no more, no fewer.
const FIND_DIRECT_SQL: &str = r#"
    SELECT c.id, c.name, c.is_group, c.created_by, c.last_message_at, c.created_at
    FROM conversations c
    WHERE c.is_group = FALSE
      AND EXISTS (SELECT 1 FROM participants p WHERE p.conversation_id = c.id AND p.user_id = $1)
      AND EXISTS (SELECT 1 FROM participants p WHERE p.conversation_id = c.id AND p.user_id = $2)
      AND NOT EXISTS (
          SELECT 1 FROM participants p
          WHERE p.conversation_id = c.id AND p.user_id NOT IN ($1, $2)
      )
    LIMIT 1
"#;

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Advisory lock key for an unordered user pair. DefaultHasher is stable
    /// within a build, which is all the lock needs: every server process
    /// running this binary computes the same key for the same pair.
    fn direct_pair_lock_key(user_a: Uuid, user_b: Uuid) -> i64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let (lo, hi) = if user_a <= user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        };

        let mut hasher = DefaultHasher::new();
        lo.hash(&mut hasher);
        hi.hash(&mut hasher);
        hasher.finish() as i64
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, name, is_group, created_by, last_message_at, created_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_or_create_direct(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> RepoResult<(Conversation, bool)> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serialize concurrent find-or-create for the same pair: both sides
        // take the same pair-keyed lock, so exactly one of them inserts.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(Self::direct_pair_lock_key(user_a, user_b))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let existing = sqlx::query_as::<_, ConversationModel>(FIND_DIRECT_SQL)
            .bind(user_a)
            .bind(user_b)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if let Some(model) = existing {
            tx.commit().await.map_err(map_db_error)?;
            return Ok((Conversation::from(model), false));
        }

        let conversation = Conversation::new_direct(user_a);

        sqlx::query(
            r#"
            INSERT INTO conversations (id, name, is_group, created_by, last_message_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(conversation.id)
        .bind(&conversation.name)
        .bind(conversation.is_group)
        .bind(conversation.created_by)
        .bind(conversation.last_message_at)
        .bind(conversation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        for user_id in [user_a, user_b] {
            sqlx::query(
                r#"
                INSERT INTO participants (conversation_id, user_id, joined_at)
                VALUES ($1, $2, NOW())
                "#,
            )
            .bind(conversation.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok((conversation, true))
    }

    #[instrument(skip(self, conversation, member_ids))]
    async fn create_group(
        &self,
        conversation: &Conversation,
        member_ids: &[Uuid],
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO conversations (id, name, is_group, created_by, last_message_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(conversation.id)
        .bind(&conversation.name)
        .bind(conversation.is_group)
        .bind(conversation.created_by)
        .bind(conversation.last_message_at)
        .bind(conversation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        for user_id in member_ids {
            sqlx::query(
                r#"
                INSERT INTO participants (conversation_id, user_id, joined_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (conversation_id, user_id) DO NOTHING
                "#,
            )
            .bind(conversation.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_visible_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Conversation>> {
        let results = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT c.id, c.name, c.is_group, c.created_by, c.last_message_at, c.created_at
            FROM conversations c
            JOIN participants p ON p.conversation_id = c.id AND p.user_id = $1
            LEFT JOIN deleted_conversations d
                ON d.conversation_id = c.id AND d.user_id = $1
            WHERE d.user_id IS NULL
            ORDER BY c.last_message_at DESC NULLS LAST, c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_deleted_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Conversation>> {
        let results = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT c.id, c.name, c.is_group, c.created_by, c.last_message_at, c.created_at
            FROM conversations c
            JOIN deleted_conversations d
                ON d.conversation_id = c.id AND d.user_id = $1
            ORDER BY d.deleted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Conversation::from).collect())
    }
}
