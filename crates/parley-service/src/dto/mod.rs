//! Data transfer objects - request and response shapes

mod requests;
mod responses;

pub use requests::{
    AttachmentUpload, CreateConversationRequest, InitiateCallRequest, SearchMessagesRequest,
    SendMessageRequest, SetFavoriteRequest, SignalRequest, ToggleReactionRequest, TypingRequest,
    UpdateMessageRequest,
};
pub use responses::{
    CallResponse, ConversationResponse, MessageResponse, ReactionSummaryResponse, ToggleAction,
    ToggleReactionResponse, UserResponse,
};
