//! Domain events - events emitted when domain state changes
//!
//! Events form a tagged union: the `eventName` discriminant plus a
//! per-variant payload. Subscribers re-apply them to mirrored state via
//! idempotent id-based upsert, so payloads carry the full entity where a
//! client would otherwise need a refetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Call, Conversation, Message, Reaction, SignalKind};

/// All domain events published to the realtime channels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "eventName")]
pub enum DomainEvent {
    // =========================================================================
    // Conversation Events
    // =========================================================================
    ConversationCreated(ConversationCreatedEvent),
    ConversationRestored(ConversationRestoredEvent),
    ConversationDeleted(ConversationDeletedEvent),

    // =========================================================================
    // Message Events
    // =========================================================================
    MessageSent(MessageSentEvent),
    MessageUpdated(MessageUpdatedEvent),
    MessageDeleted(MessageDeletedEvent),
    MessageRead(MessageReadEvent),
    ConversationRead(ConversationReadEvent),

    // =========================================================================
    // Reaction Events
    // =========================================================================
    ReactionAdded(ReactionAddedEvent),
    ReactionRemoved(ReactionRemovedEvent),

    // =========================================================================
    // Presence Events
    // =========================================================================
    UserTyping(UserTypingEvent),
    UserStatusUpdated(UserStatusUpdatedEvent),

    // =========================================================================
    // Call Events
    // =========================================================================
    CallInitiated(CallInitiatedEvent),
    CallAccepted(CallAcceptedEvent),
    CallRejected(CallRejectedEvent),
    CallEnded(CallEndedEvent),
    WebRTCSignal(WebRtcSignalEvent),
}

impl DomainEvent {
    /// Get the stable event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConversationCreated(_) => "ConversationCreated",
            Self::ConversationRestored(_) => "ConversationRestored",
            Self::ConversationDeleted(_) => "ConversationDeleted",
            Self::MessageSent(_) => "MessageSent",
            Self::MessageUpdated(_) => "MessageUpdated",
            Self::MessageDeleted(_) => "MessageDeleted",
            Self::MessageRead(_) => "MessageRead",
            Self::ConversationRead(_) => "ConversationRead",
            Self::ReactionAdded(_) => "ReactionAdded",
            Self::ReactionRemoved(_) => "ReactionRemoved",
            Self::UserTyping(_) => "UserTyping",
            Self::UserStatusUpdated(_) => "UserStatusUpdated",
            Self::CallInitiated(_) => "CallInitiated",
            Self::CallAccepted(_) => "CallAccepted",
            Self::CallRejected(_) => "CallRejected",
            Self::CallEnded(_) => "CallEnded",
            Self::WebRTCSignal(_) => "WebRTCSignal",
        }
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationCreatedEvent {
    pub conversation: Conversation,
    pub participant_ids: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRestoredEvent {
    pub conversation: Conversation,
    pub participant_ids: Vec<Uuid>,
    pub restored_at: DateTime<Utc>,
}

/// Per-user deletion: only the deleting user's view changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDeletedEvent {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSentEvent {
    pub message: Message,
    pub participant_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdatedEvent {
    pub message: Message,
    /// Body before the edit, kept for client-side audit/undo
    pub previous_body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletedEvent {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    pub author_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReadEvent {
    pub conversation_id: Uuid,
    pub message_id: Uuid,
    pub reader_id: Uuid,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationReadEvent {
    pub conversation_id: Uuid,
    pub reader_id: Uuid,
    pub message_ids: Vec<Uuid>,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    pub conversation_id: Uuid,
    pub reaction: Reaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRemovedEvent {
    pub conversation_id: Uuid,
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTypingEvent {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusUpdatedEvent {
    pub user_id: Uuid,
    pub is_online: bool,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallInitiatedEvent {
    pub call: Call,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAcceptedEvent {
    pub call: Call,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRejectedEvent {
    pub call: Call,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEndedEvent {
    pub call: Call,
    pub ended_by: Uuid,
}

/// Opaque relay: the payload is validated (for offer/answer) but never
/// interpreted or stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebRtcSignalEvent {
    pub call_id: Uuid,
    pub conversation_id: Uuid,
    pub signal_type: SignalKind,
    pub payload: serde_json::Value,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
}
