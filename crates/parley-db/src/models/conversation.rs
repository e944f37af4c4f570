//! Conversation, participant, and deletion marker database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use parley_core::{Conversation, Participant};

/// Database model for the conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: Uuid,
    pub name: Option<String>,
    pub is_group: bool,
    pub created_by: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            is_group: model.is_group,
            created_by: model.created_by,
            last_message_at: model.last_message_at,
            created_at: model.created_at,
        }
    }
}

/// Database model for the participants table
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantModel {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub last_read_at: Option<DateTime<Utc>>,
    pub is_favorite: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<ParticipantModel> for Participant {
    fn from(model: ParticipantModel) -> Self {
        Self {
            conversation_id: model.conversation_id,
            user_id: model.user_id,
            last_read_at: model.last_read_at,
            is_favorite: model.is_favorite,
            joined_at: model.joined_at,
        }
    }
}

