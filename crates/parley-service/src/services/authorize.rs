//! Channel authorization predicate
//!
//! Consumed by the transport when a client asks to subscribe. Personal
//! channels belong to their user; conversation channels (and their presence
//! side-channels) belong to participants. A deletion marker does not revoke
//! conversation-channel access: a user who hid a thread keeps their
//! subscription, and the next message restores visibility client-side.

use uuid::Uuid;

use parley_cache::Channel;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Decide whether a user may subscribe to a channel
pub async fn authorize_channel(
    ctx: &ServiceContext,
    user_id: Uuid,
    channel: &Channel,
) -> ServiceResult<bool> {
    match channel {
        Channel::User(owner) => Ok(*owner == user_id),
        Channel::Conversation(conversation_id)
        | Channel::ConversationPresence(conversation_id) => Ok(ctx
            .participant_repo()
            .is_participant(*conversation_id, user_id)
            .await?),
        Channel::Presence => Ok(true),
    }
}
