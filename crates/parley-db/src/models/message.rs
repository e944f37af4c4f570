//! Message database model

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use parley_core::{Attachment, Message};

/// Database model for the messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub author_id: Uuid,
    pub body: Option<String>,
    pub kind: String,
    pub attachments: Json<Vec<Attachment>>,
    pub read_at: Option<DateTime<Utc>>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    /// Check if message is tombstoned
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Self {
            id: model.id,
            conversation_id: model.conversation_id,
            author_id: model.author_id,
            body: model.body,
            // kind is CHECK-constrained in the schema
            kind: model.kind.parse().unwrap_or_default(),
            attachments: model.attachments.0,
            read_at: model.read_at,
            edited_at: model.edited_at,
            deleted_at: model.deleted_at,
            created_at: model.created_at,
        }
    }
}
