//! PostgreSQL implementation of CallRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use parley_core::{Call, CallRepository, CallStatus, RepoResult};

use crate::models::CallModel;

use super::error::{call_not_found, map_db_error};

const CALL_COLUMNS: &str = "call_id, conversation_id, caller_id, receiver_id, status, \
                            started_at, ended_at, duration_secs, created_at";

/// PostgreSQL implementation of CallRepository
#[derive(Clone)]
pub struct PgCallRepository {
    pool: PgPool,
}

impl PgCallRepository {
    /// Create a new PgCallRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CallRepository for PgCallRepository {
    #[instrument(skip(self))]
    async fn find_by_token(&self, call_id: Uuid) -> RepoResult<Option<Call>> {
        let result = sqlx::query_as::<_, CallModel>(&format!(
            "SELECT {CALL_COLUMNS} FROM video_calls WHERE call_id = $1"
        ))
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(CallModel::into_entity).transpose()
    }

    #[instrument(skip(self, call))]
    async fn create(&self, call: &Call) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO video_calls
                (call_id, conversation_id, caller_id, receiver_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(call.call_id)
        .bind(call.conversation_id)
        .bind(call.caller_id)
        .bind(call.receiver_id)
        .bind(call.status.to_string())
        .bind(call.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_active(&self, conversation_id: Uuid) -> RepoResult<Option<Call>> {
        let result = sqlx::query_as::<_, CallModel>(&format!(
            r#"
            SELECT {CALL_COLUMNS} FROM video_calls
            WHERE conversation_id = $1 AND status IN ('ringing', 'active')
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(CallModel::into_entity).transpose()
    }

    #[instrument(skip(self))]
    async fn purge_stale(
        &self,
        conversation_id: Uuid,
        cutoff: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        // Abandoned ringing calls were never picked up; abandoned active
        // calls at least happened.
        let result = sqlx::query(
            r#"
            UPDATE video_calls
            SET status = CASE WHEN status = 'ringing' THEN 'missed' ELSE 'ended' END,
                ended_at = $3
            WHERE conversation_id = $1
              AND status IN ('ringing', 'active')
              AND created_at < $2
            "#,
        )
        .bind(conversation_id)
        .bind(cutoff)
        .bind(ended_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn accept(&self, call_id: Uuid, started_at: DateTime<Utc>) -> RepoResult<bool> {
        // Status-guarded update: of two concurrent accepts only one sees
        // 'ringing', the other reports a wrong-state failure.
        let result = sqlx::query(
            r#"
            UPDATE video_calls
            SET status = 'active', started_at = $2
            WHERE call_id = $1 AND status = 'ringing'
            "#,
        )
        .bind(call_id)
        .bind(started_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn finish(
        &self,
        call_id: Uuid,
        status: CallStatus,
        ended_at: Option<DateTime<Utc>>,
        duration_secs: Option<i64>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE video_calls
            SET status = $2, ended_at = $3, duration_secs = $4
            WHERE call_id = $1
            "#,
        )
        .bind(call_id)
        .bind(status.to_string())
        .bind(ended_at)
        .bind(duration_secs)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(call_not_found(call_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Call>> {
        let results = sqlx::query_as::<_, CallModel>(&format!(
            r#"
            SELECT {CALL_COLUMNS} FROM video_calls
            WHERE conversation_id = $1 AND status = 'ended'
            ORDER BY ended_at DESC NULLS LAST
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(CallModel::into_entity).collect()
    }
}
