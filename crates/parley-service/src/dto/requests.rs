//! Request DTOs with validation rules

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use parley_core::{Attachment, SignalKind};

/// Create a conversation: a group, or the unique 1:1 for a single other user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateConversationRequest {
    #[validate(length(min = 1, message = "at least one other participant is required"))]
    pub user_ids: Vec<Uuid>,
    #[validate(length(max = 120))]
    pub name: Option<String>,
    #[serde(default)]
    pub is_group: bool,
}

/// Stored-attachment descriptor supplied by the storage collaborator
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttachmentUpload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 1024))]
    pub path: String,
    #[validate(length(min = 1, max = 255))]
    pub mime_type: String,
    #[validate(range(min = 0))]
    pub size_bytes: i64,
}

impl From<AttachmentUpload> for Attachment {
    fn from(upload: AttachmentUpload) -> Self {
        Self {
            name: upload.name,
            path: upload.path,
            mime_type: upload.mime_type,
            size_bytes: upload.size_bytes,
        }
    }
}

/// Send a message into a conversation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub conversation_id: Uuid,
    #[validate(length(max = 5000))]
    pub body: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<AttachmentUpload>,
}

/// Edit a message body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

/// Toggle an emoji reaction
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleReactionRequest {
    #[validate(length(min = 1, max = 16))]
    pub emoji: String,
}

/// Typing indicator
#[derive(Debug, Clone, Deserialize)]
pub struct TypingRequest {
    pub is_typing: bool,
}

/// Favorite flag on a conversation
#[derive(Debug, Clone, Deserialize)]
pub struct SetFavoriteRequest {
    pub is_favorite: bool,
}

/// Search messages by body substring
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchMessagesRequest {
    #[validate(length(min = 1, max = 100))]
    pub query: String,
    pub conversation_id: Option<Uuid>,
}

/// Start a call
#[derive(Debug, Clone, Deserialize)]
pub struct InitiateCallRequest {
    pub conversation_id: Uuid,
    pub receiver_id: Uuid,
}

/// Relay a WebRTC signal to the other call party
#[derive(Debug, Clone, Deserialize)]
pub struct SignalRequest {
    #[serde(rename = "type")]
    pub signal_type: SignalKind,
    pub payload: Value,
    pub target_user_id: Uuid,
}
