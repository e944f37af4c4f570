//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use parley_core::Reaction;

/// Database model for the reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReactionModel> for Reaction {
    fn from(model: ReactionModel) -> Self {
        Self {
            message_id: model.message_id,
            user_id: model.user_id,
            emoji: model.emoji,
            created_at: model.created_at,
        }
    }
}
