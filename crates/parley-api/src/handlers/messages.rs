//! Message handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use parley_service::{
    MessageResponse, MessageService, SearchMessagesRequest, SendMessageRequest,
    UpdateMessageRequest,
};

use crate::extractors::{AuthUser, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// One page of a conversation's messages, oldest first
///
/// GET /conversations/{conversation_id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let messages = MessageService::new(state.service_context())
        .page(conversation_id, auth.user_id, pagination.message_page())
        .await?;
    Ok(Json(messages))
}

/// Send a message
///
/// POST /messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let message = MessageService::new(state.service_context())
        .send(auth.user_id, request)
        .await?;
    Ok(Created(Json(message)))
}

/// Edit a message
///
/// PATCH /messages/{message_id}
pub async fn update_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let message = MessageService::new(state.service_context())
        .edit(message_id, auth.user_id, request.body)
        .await?;
    Ok(Json(message))
}

/// Soft-delete a message
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<Uuid>,
) -> ApiResult<NoContent> {
    MessageService::new(state.service_context())
        .soft_delete(message_id, auth.user_id)
        .await?;
    Ok(NoContent)
}

/// Stamp a read receipt
///
/// POST /messages/{message_id}/read
pub async fn mark_message_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<Uuid>,
) -> ApiResult<NoContent> {
    MessageService::new(state.service_context())
        .mark_read(message_id, auth.user_id)
        .await?;
    Ok(NoContent)
}

/// Search messages across visible conversations
///
/// GET /messages/search
pub async fn search_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(request): Query<SearchMessagesRequest>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    use validator::Validate;
    request
        .validate()
        .map_err(crate::response::ApiError::Validation)?;

    let messages = MessageService::new(state.service_context())
        .search(auth.user_id, &request.query, request.conversation_id)
        .await?;
    Ok(Json(messages))
}
