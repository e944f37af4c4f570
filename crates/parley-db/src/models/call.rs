//! Call database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use parley_core::{Call, DomainError, RepoResult};

/// Database model for the video_calls table
#[derive(Debug, Clone, FromRow)]
pub struct CallModel {
    pub call_id: Uuid,
    pub conversation_id: Uuid,
    pub caller_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl CallModel {
    /// Convert into the domain entity. A status outside the schema's CHECK
    /// set surfaces as an error, never a silent default.
    pub fn into_entity(self) -> RepoResult<Call> {
        let status = self
            .status
            .parse()
            .map_err(|e: String| DomainError::Internal(e))?;
        Ok(Call {
            call_id: self.call_id,
            conversation_id: self.conversation_id,
            caller_id: self.caller_id,
            receiver_id: self.receiver_id,
            status,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_secs: self.duration_secs,
            created_at: self.created_at,
        })
    }
}
