//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{Call, CallStatus, Conversation, Message, Participant, Reaction, User};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// List all users except the given one (contact list)
    async fn list_except(&self, user_id: Uuid) -> RepoResult<Vec<User>>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Update durable presence state
    async fn set_presence(
        &self,
        id: Uuid,
        is_online: bool,
        last_seen_at: DateTime<Utc>,
    ) -> RepoResult<()>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Conversation>>;

    /// Find-or-create the unique direct conversation for an unordered user
    /// pair. The existence check and insert run atomically so concurrent
    /// calls from both users yield exactly one row. Returns the conversation
    /// and whether it was created by this call.
    async fn find_or_create_direct(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> RepoResult<(Conversation, bool)>;

    /// Create a group conversation with its participant rows. Groups are
    /// never deduplicated.
    async fn create_group(
        &self,
        conversation: &Conversation,
        member_ids: &[Uuid],
    ) -> RepoResult<()>;

    /// List conversations visible to a user: participant, no deletion
    /// marker, ordered by last activity descending
    async fn find_visible_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Conversation>>;

    /// List conversations the user has hidden via a deletion marker
    async fn find_deleted_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Conversation>>;
}

// ============================================================================
// Participant Repository
// ============================================================================

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Find a participant row
    async fn find(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<Option<Participant>>;

    /// Check membership
    async fn is_participant(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    /// All participant user ids of a conversation
    async fn participant_ids(&self, conversation_id: Uuid) -> RepoResult<Vec<Uuid>>;

    /// Advance the read-receipt anchor
    async fn set_last_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Set the favorite flag
    async fn set_favorite(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        is_favorite: bool,
    ) -> RepoResult<()>;
}

// ============================================================================
// Visibility Repository (per-user deletion markers)
// ============================================================================

#[async_trait]
pub trait VisibilityRepository: Send + Sync {
    /// Check whether a user holds a deletion marker on a conversation
    async fn is_deleted_for(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    /// Upsert a deletion marker. Idempotent: repeated calls are no-ops.
    async fn mark_deleted(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Remove a deletion marker. Idempotent.
    async fn restore(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<()>;

    /// All users currently holding a deletion marker on a conversation
    async fn deleted_user_ids(&self, conversation_id: Uuid) -> RepoResult<Vec<Uuid>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Offset pagination for message queries. Pages are fetched newest-first for
/// boundary stability under concurrent inserts.
#[derive(Debug, Clone, Copy)]
pub struct MessagePage {
    pub page: i64,
    pub per_page: i64,
}

impl MessagePage {
    pub const DEFAULT_PER_PAGE: i64 = 50;
    pub const MAX_PER_PAGE: i64 = 100;

    /// Build a page query, clamping to sane bounds
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Row offset of this page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for MessagePage {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PER_PAGE)
    }
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID, tombstoned rows included
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>>;

    /// Insert a message, serialized per conversation: bumps the
    /// conversation's last activity and returns the message count in the
    /// conversation after the insert (1 means this was the first message).
    async fn create(&self, message: &Message) -> RepoResult<i64>;

    /// Overwrite the body and stamp `edited_at`
    async fn update_body(
        &self,
        id: Uuid,
        body: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Tombstone: clear body and attachments, stamp `deleted_at`
    async fn tombstone(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()>;

    /// Stamp `read_at` if currently unread. Returns false when the message
    /// was already read (caller treats that as a no-op).
    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool>;

    /// Mark every unread message in the conversation not authored by
    /// `reader_id` as read; returns the ids that were stamped
    async fn mark_unread_read(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Uuid>>;

    /// Count messages authored by someone else that the user has not read:
    /// newer than `last_read_at`, or all of them when `last_read_at` is None
    async fn unread_count(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        last_read_at: Option<DateTime<Utc>>,
    ) -> RepoResult<i64>;

    /// One page of messages, newest first (callers reverse for display)
    async fn page(&self, conversation_id: Uuid, page: MessagePage) -> RepoResult<Vec<Message>>;

    /// Latest message of a conversation, if any
    async fn latest(&self, conversation_id: Uuid) -> RepoResult<Option<Message>>;

    /// Substring search over bodies of messages visible to the user,
    /// newest first, capped at `limit`
    async fn search(
        &self,
        user_id: Uuid,
        query: &str,
        conversation_id: Option<Uuid>,
        limit: i64,
    ) -> RepoResult<Vec<Message>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Find an exact (message, user, emoji) reaction
    async fn find(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> RepoResult<Option<Reaction>>;

    /// All reactions on a message
    async fn find_by_message(&self, message_id: Uuid) -> RepoResult<Vec<Reaction>>;

    /// Insert a reaction
    async fn create(&self, reaction: &Reaction) -> RepoResult<()>;

    /// Delete an exact (message, user, emoji) reaction
    async fn delete(&self, message_id: Uuid, user_id: Uuid, emoji: &str) -> RepoResult<()>;
}

// ============================================================================
// Call Repository
// ============================================================================

#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Find call by its opaque token
    async fn find_by_token(&self, call_id: Uuid) -> RepoResult<Option<Call>>;

    /// Insert a new call record
    async fn create(&self, call: &Call) -> RepoResult<()>;

    /// The non-terminal (ringing/active) call of a conversation, if any
    async fn find_active(&self, conversation_id: Uuid) -> RepoResult<Option<Call>>;

    /// Terminate abandoned calls created before `cutoff`: stale ringing
    /// calls become `missed`, stale active calls `ended`. Returns how many
    /// rows changed.
    async fn purge_stale(
        &self,
        conversation_id: Uuid,
        cutoff: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> RepoResult<u64>;

    /// Transition ringing → active, stamping `started_at`. Returns false
    /// when the call was not ringing (lost race or wrong state).
    async fn accept(&self, call_id: Uuid, started_at: DateTime<Utc>) -> RepoResult<bool>;

    /// Force a terminal status, stamping `ended_at`/duration when given
    async fn finish(
        &self,
        call_id: Uuid,
        status: CallStatus,
        ended_at: Option<DateTime<Utc>>,
        duration_secs: Option<i64>,
    ) -> RepoResult<()>;

    /// Ended calls of a conversation, newest first
    async fn history(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Call>>;
}
