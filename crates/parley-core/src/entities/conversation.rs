//! Conversation entity and the participant join entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation entity
///
/// A conversation is never hard-deleted; "deletion" is a per-user visibility
/// marker held outside this entity (see `VisibilityRepository`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub name: Option<String>,
    pub is_group: bool,
    pub created_by: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new direct (1:1) conversation
    pub fn new_direct(created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            is_group: false,
            created_by,
            last_message_at: None,
            created_at: Utc::now(),
        }
    }

    /// Create a new group conversation
    pub fn new_group(created_by: Uuid, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            is_group: true,
            created_by,
            last_message_at: None,
            created_at: Utc::now(),
        }
    }

    /// Check if this is a direct (1:1) conversation
    #[inline]
    pub fn is_direct(&self) -> bool {
        !self.is_group
    }
}

/// Participant join entity - one row per (conversation, user)
///
/// `last_read_at` is the sole read-receipt anchor used for unread-count
/// computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub last_read_at: Option<DateTime<Utc>>,
    pub is_favorite: bool,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// Create a new Participant
    pub fn new(conversation_id: Uuid, user_id: Uuid) -> Self {
        Self {
            conversation_id,
            user_id,
            last_read_at: None,
            is_favorite: false,
            joined_at: Utc::now(),
        }
    }

    /// Check whether the participant has ever read the conversation
    #[inline]
    pub fn has_read(&self) -> bool {
        self.last_read_at.is_some()
    }
}
