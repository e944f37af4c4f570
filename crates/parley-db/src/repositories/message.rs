//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use parley_core::{Message, MessagePage, MessageRepository, RepoResult};

use crate::models::MessageModel;

use super::error::{conversation_not_found, map_db_error, message_not_found};

const MESSAGE_COLUMNS: &str = "id, conversation_id, author_id, body, kind, attachments, \
                               read_at, edited_at, deleted_at, created_at";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message))]
    async fn create(&self, message: &Message) -> RepoResult<i64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Row lock on the conversation serializes inserts per conversation,
        // so two concurrent "first message" sends cannot both count one.
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM conversations WHERE id = $1 FOR UPDATE",
        )
        .bind(message.conversation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if locked.is_none() {
            return Err(conversation_not_found(message.conversation_id));
        }

        sqlx::query(
            r#"
            INSERT INTO messages
                (id, conversation_id, author_id, body, kind, attachments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.author_id)
        .bind(&message.body)
        .bind(message.kind.to_string())
        .bind(Json(&message.attachments))
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query("UPDATE conversations SET last_message_at = $2 WHERE id = $1")
            .bind(message.conversation_id)
            .bind(message.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = $1",
        )
        .bind(message.conversation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self, body))]
    async fn update_body(&self, id: Uuid, body: &str, edited_at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET body = $2, edited_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(body)
        .bind(edited_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn tombstone(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET body = NULL, attachments = '[]', deleted_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = $2
            WHERE id = $1 AND read_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_unread_read(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE messages
            SET read_at = $3
            WHERE conversation_id = $1
              AND author_id <> $2
              AND read_at IS NULL
              AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn unread_count(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        last_read_at: Option<DateTime<Utc>>,
    ) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE conversation_id = $1
              AND author_id <> $2
              AND deleted_at IS NULL
              AND ($3::timestamptz IS NULL OR created_at > $3)
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(last_read_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn page(&self, conversation_id: Uuid, page: MessagePage) -> RepoResult<Vec<Message>> {
        // Newest first keeps page boundaries stable under concurrent inserts;
        // the service reverses to oldest-first before delivery.
        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(conversation_id)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn latest(&self, conversation_id: Uuid) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, query))]
    async fn search(
        &self,
        user_id: Uuid,
        query: &str,
        conversation_id: Option<Uuid>,
        limit: i64,
    ) -> RepoResult<Vec<Message>> {
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));

        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages m
            WHERE EXISTS (
                    SELECT 1 FROM participants p
                    WHERE p.conversation_id = m.conversation_id AND p.user_id = $1
                  )
              AND NOT EXISTS (
                    SELECT 1 FROM deleted_conversations d
                    WHERE d.conversation_id = m.conversation_id AND d.user_id = $1
                  )
              AND m.deleted_at IS NULL
              AND m.body ILIKE $2
              AND ($3::uuid IS NULL OR m.conversation_id = $3)
            ORDER BY m.created_at DESC
            LIMIT $4
            "#
        ))
        .bind(user_id)
        .bind(pattern)
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }
}
