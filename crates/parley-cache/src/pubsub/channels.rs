//! Logical channel definitions.
//!
//! These names are the client-facing contract: subscribers authorize against
//! and listen on exactly these strings, so they must stay stable.

use uuid::Uuid;

/// Channel prefix for per-user events
pub const USER_CHANNEL_PREFIX: &str = "user.";
/// Channel prefix for per-conversation events (messages, reactions, receipts)
pub const CONVERSATION_CHANNEL_PREFIX: &str = "conversation.";
/// Channel prefix for per-conversation presence (typing indicators)
pub const CONVERSATION_PRESENCE_PREFIX: &str = "presence.conversation.";
/// Shared channel for global presence (online/offline status)
pub const GLOBAL_PRESENCE_CHANNEL: &str = "presence";

/// Logical channel types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Events for a specific user (all their sessions)
    User(Uuid),
    /// Message/reaction/receipt stream of a conversation
    Conversation(Uuid),
    /// Typing indicators of a conversation
    ConversationPresence(Uuid),
    /// Global presence broadcasts
    Presence,
}

impl Channel {
    /// Create a personal channel
    #[must_use]
    pub fn user(user_id: Uuid) -> Self {
        Self::User(user_id)
    }

    /// Create a conversation channel
    #[must_use]
    pub fn conversation(conversation_id: Uuid) -> Self {
        Self::Conversation(conversation_id)
    }

    /// Create a conversation presence channel
    #[must_use]
    pub fn conversation_presence(conversation_id: Uuid) -> Self {
        Self::ConversationPresence(conversation_id)
    }

    /// Get the channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
            Self::Conversation(id) => format!("{CONVERSATION_CHANNEL_PREFIX}{id}"),
            Self::ConversationPresence(id) => format!("{CONVERSATION_PRESENCE_PREFIX}{id}"),
            Self::Presence => GLOBAL_PRESENCE_CHANNEL.to_string(),
        }
    }

    /// Parse a channel name back to a `Channel`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name == GLOBAL_PRESENCE_CHANNEL {
            return Some(Self::Presence);
        }

        // presence.conversation. must be checked before conversation.
        if let Some(id_str) = name.strip_prefix(CONVERSATION_PRESENCE_PREFIX) {
            return id_str.parse().ok().map(Self::ConversationPresence);
        }

        if let Some(id_str) = name.strip_prefix(CONVERSATION_CHANNEL_PREFIX) {
            return id_str.parse().ok().map(Self::Conversation);
        }

        if let Some(id_str) = name.strip_prefix(USER_CHANNEL_PREFIX) {
            return id_str.parse().ok().map(Self::User);
        }

        None
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
