//! Domain events

mod domain_event;

pub use domain_event::{
    CallAcceptedEvent, CallEndedEvent, CallInitiatedEvent, CallRejectedEvent,
    ConversationCreatedEvent, ConversationDeletedEvent, ConversationReadEvent,
    ConversationRestoredEvent, DomainEvent, MessageDeletedEvent, MessageReadEvent,
    MessageSentEvent, MessageUpdatedEvent, ReactionAddedEvent, ReactionRemovedEvent,
    UserStatusUpdatedEvent, UserTypingEvent, WebRtcSignalEvent,
};
