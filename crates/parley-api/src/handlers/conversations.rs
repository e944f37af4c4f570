//! Conversation handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use parley_service::{
    ConversationResponse, ConversationService, CreateConversationRequest, MessageService,
    SetFavoriteRequest, TypingRequest, VisibilityService,
};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List the caller's visible conversations, last activity first
///
/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let conversations = VisibilityService::new(state.service_context())
        .list_visible(auth.user_id)
        .await?;
    Ok(Json(conversations))
}

/// Create a conversation (direct conversations are find-or-create)
///
/// POST /conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateConversationRequest>,
) -> ApiResult<Created<Json<ConversationResponse>>> {
    let conversation = ConversationService::new(state.service_context())
        .create(auth.user_id, request)
        .await?;
    Ok(Created(Json(conversation)))
}

/// Fetch one conversation
///
/// GET /conversations/{conversation_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<ConversationResponse>> {
    let conversation = ConversationService::new(state.service_context())
        .get(conversation_id, auth.user_id)
        .await?;
    Ok(Json(conversation))
}

/// Hide a conversation for the caller
///
/// DELETE /conversations/{conversation_id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<NoContent> {
    VisibilityService::new(state.service_context())
        .mark_deleted(conversation_id, auth.user_id)
        .await?;
    Ok(NoContent)
}

/// Restore a hidden conversation
///
/// POST /conversations/{conversation_id}/restore
pub async fn restore_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<ConversationResponse>> {
    let context = state.service_context();
    VisibilityService::new(context)
        .restore(conversation_id, auth.user_id)
        .await?;
    let conversation = ConversationService::new(context)
        .get(conversation_id, auth.user_id)
        .await?;
    Ok(Json(conversation))
}

/// List the caller's hidden conversations
///
/// GET /conversations/deleted
pub async fn list_deleted_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let conversations = VisibilityService::new(state.service_context())
        .list_deleted(auth.user_id)
        .await?;
    Ok(Json(conversations))
}

/// Mark every unread message in the conversation as read
///
/// POST /conversations/{conversation_id}/read
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<NoContent> {
    MessageService::new(state.service_context())
        .mark_conversation_read(conversation_id, auth.user_id)
        .await?;
    Ok(NoContent)
}

/// Broadcast a typing indicator
///
/// POST /conversations/{conversation_id}/typing
pub async fn typing(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<TypingRequest>,
) -> ApiResult<NoContent> {
    parley_service::PresenceService::new(state.service_context())
        .typing(conversation_id, auth.user_id, request.is_typing)
        .await?;
    Ok(NoContent)
}

/// Set the caller's favorite flag
///
/// PUT /conversations/{conversation_id}/favorite
pub async fn set_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SetFavoriteRequest>,
) -> ApiResult<NoContent> {
    ConversationService::new(state.service_context())
        .set_favorite(conversation_id, auth.user_id, request.is_favorite)
        .await?;
    Ok(NoContent)
}
