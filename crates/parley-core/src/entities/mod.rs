//! Domain entities

mod call;
mod conversation;
mod message;
mod reaction;
mod user;

pub use call::{Call, CallStatus, SignalKind, CALL_STALE_AFTER};
pub use conversation::{Conversation, Participant};
pub use message::{Attachment, Message, MessageKind, EDIT_WINDOW};
pub use reaction::{Reaction, ReactionSummary};
pub use user::User;
