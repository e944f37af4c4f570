//! # parley-core
//!
//! Domain layer containing entities, domain events, repository traits, and
//! collaborator ports. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod signaling;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, Call, CallStatus, Conversation, Message, MessageKind, Participant, Reaction,
    ReactionSummary, SignalKind, User, CALL_STALE_AFTER, EDIT_WINDOW,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    CallRepository, ConversationRepository, EventTransport, MessagePage, MessageRepository,
    ParticipantRepository, PresenceStore, ReactionRepository, RepoResult, UserRepository,
    VisibilityRepository,
};
