//! Fan-out router - maps domain events to destination channels
//!
//! One state change becomes one event published to the exact set of logical
//! channels its subscribers listen on. Publication is fire-and-forget with
//! respect to the triggering request: the durable mutation has already
//! committed, so a publish failure is logged and never propagated.

use std::sync::Arc;

use parley_core::{DomainEvent, EventTransport};
use parley_cache::Channel;
use tracing::warn;

/// Routes domain events onto logical channels
#[derive(Clone)]
pub struct FanoutRouter {
    transport: Arc<dyn EventTransport>,
}

impl FanoutRouter {
    /// Create a new router over a transport
    pub fn new(transport: Arc<dyn EventTransport>) -> Self {
        Self { transport }
    }

    /// The destination channels of an event
    ///
    /// | Event | Channel(s) |
    /// |---|---|
    /// | MessageSent | conversation + every other participant's personal |
    /// | ConversationCreated/Restored | every participant's personal |
    /// | ConversationDeleted | the deleting user's personal only |
    /// | MessageUpdated/Deleted | conversation |
    /// | ReactionAdded/Removed | conversation |
    /// | MessageRead / ConversationRead | conversation + reader's personal |
    /// | UserTyping | conversation presence |
    /// | UserStatusUpdated | global presence |
    /// | CallInitiated | receiver's personal only |
    /// | CallAccepted/Rejected | caller's personal (receiver acted) |
    /// | CallEnded | the other party's personal |
    /// | WebRTCSignal | target user's personal only |
    pub fn channels_for(event: &DomainEvent) -> Vec<Channel> {
        match event {
            DomainEvent::MessageSent(e) => {
                let mut channels = vec![Channel::conversation(e.message.conversation_id)];
                channels.extend(
                    e.participant_ids
                        .iter()
                        .filter(|&&id| id != e.message.author_id)
                        .map(|&id| Channel::user(id)),
                );
                channels
            }
            DomainEvent::ConversationCreated(e) => {
                e.participant_ids.iter().map(|&id| Channel::user(id)).collect()
            }
            DomainEvent::ConversationRestored(e) => {
                e.participant_ids.iter().map(|&id| Channel::user(id)).collect()
            }
            DomainEvent::ConversationDeleted(e) => vec![Channel::user(e.user_id)],
            DomainEvent::MessageUpdated(e) => {
                vec![Channel::conversation(e.message.conversation_id)]
            }
            DomainEvent::MessageDeleted(e) => vec![Channel::conversation(e.conversation_id)],
            DomainEvent::MessageRead(e) => vec![
                Channel::conversation(e.conversation_id),
                Channel::user(e.reader_id),
            ],
            DomainEvent::ConversationRead(e) => vec![
                Channel::conversation(e.conversation_id),
                Channel::user(e.reader_id),
            ],
            DomainEvent::ReactionAdded(e) => vec![Channel::conversation(e.conversation_id)],
            DomainEvent::ReactionRemoved(e) => vec![Channel::conversation(e.conversation_id)],
            DomainEvent::UserTyping(e) => {
                vec![Channel::conversation_presence(e.conversation_id)]
            }
            DomainEvent::UserStatusUpdated(_) => vec![Channel::Presence],
            DomainEvent::CallInitiated(e) => vec![Channel::user(e.call.receiver_id)],
            DomainEvent::CallAccepted(e) => vec![Channel::user(e.call.caller_id)],
            DomainEvent::CallRejected(e) => vec![Channel::user(e.call.caller_id)],
            DomainEvent::CallEnded(e) => {
                match e.call.other_party(e.ended_by) {
                    Some(other) => vec![Channel::user(other)],
                    // ended_by is validated upstream; an unknown actor gets
                    // no channels rather than a misdirected notification
                    None => Vec::new(),
                }
            }
            DomainEvent::WebRTCSignal(e) => vec![Channel::user(e.to_user_id)],
        }
    }

    /// Publish an event to all of its destination channels, best-effort
    pub async fn publish(&self, event: DomainEvent) {
        for channel in Self::channels_for(&event) {
            if let Err(e) = self.transport.publish(&channel.name(), &event).await {
                warn!(
                    channel = %channel,
                    event = %event.name(),
                    error = %e,
                    "Failed to publish event"
                );
            }
        }
    }
}

impl std::fmt::Debug for FanoutRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutRouter").finish()
    }
}
