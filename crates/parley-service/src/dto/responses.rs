//! Response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use parley_core::{
    Attachment, Call, CallStatus, Conversation, Message, MessageKind, ReactionSummary, User,
};

/// User summary
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            is_online: user.is_online,
            last_seen_at: user.last_seen_at,
        }
    }
}

/// Per-emoji reaction summary
#[derive(Debug, Clone, Serialize)]
pub struct ReactionSummaryResponse {
    pub emoji: String,
    pub count: i64,
    pub user_ids: Vec<Uuid>,
}

impl From<ReactionSummary> for ReactionSummaryResponse {
    fn from(summary: ReactionSummary) -> Self {
        Self {
            emoji: summary.emoji,
            count: summary.count,
            user_ids: summary.user_ids,
        }
    }
}

/// A message with its reaction summaries
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub author_id: Uuid,
    pub body: Option<String>,
    pub kind: MessageKind,
    pub attachments: Vec<Attachment>,
    pub read_at: Option<DateTime<Utc>>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub reactions: Vec<ReactionSummaryResponse>,
}

impl MessageResponse {
    /// Build from a message and its reaction summaries
    pub fn new(message: Message, reactions: Vec<ReactionSummary>) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            author_id: message.author_id,
            body: message.body,
            kind: message.kind,
            attachments: message.attachments,
            read_at: message.read_at,
            edited_at: message.edited_at,
            deleted_at: message.deleted_at,
            created_at: message.created_at,
            reactions: reactions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self::new(message, Vec::new())
    }
}

/// A conversation annotated for one user's sidebar
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub is_group: bool,
    pub created_by: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<UserResponse>,
    pub latest_message: Option<MessageResponse>,
    pub unread_count: i64,
    pub is_favorite: bool,
}

impl ConversationResponse {
    /// Build from a conversation plus per-user annotations
    pub fn new(
        conversation: Conversation,
        participants: Vec<UserResponse>,
        latest_message: Option<MessageResponse>,
        unread_count: i64,
        is_favorite: bool,
    ) -> Self {
        Self {
            id: conversation.id,
            name: conversation.name,
            is_group: conversation.is_group,
            created_by: conversation.created_by,
            last_message_at: conversation.last_message_at,
            created_at: conversation.created_at,
            participants,
            latest_message,
            unread_count,
            is_favorite,
        }
    }
}

/// Call state as seen by clients
#[derive(Debug, Clone, Serialize)]
pub struct CallResponse {
    pub call_id: Uuid,
    pub conversation_id: Uuid,
    pub caller_id: Uuid,
    pub receiver_id: Uuid,
    pub status: CallStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Call> for CallResponse {
    fn from(call: Call) -> Self {
        Self {
            call_id: call.call_id,
            conversation_id: call.conversation_id,
            caller_id: call.caller_id,
            receiver_id: call.receiver_id,
            status: call.status,
            started_at: call.started_at,
            ended_at: call.ended_at,
            duration_secs: call.duration_secs,
            created_at: call.created_at,
        }
    }
}

/// Result of a reaction toggle
#[derive(Debug, Clone, Serialize)]
pub struct ToggleReactionResponse {
    pub action: ToggleAction,
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub emoji: String,
}

/// Which way a toggle went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}
