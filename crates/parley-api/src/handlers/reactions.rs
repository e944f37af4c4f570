//! Reaction handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use parley_service::{
    ReactionService, ReactionSummaryResponse, ToggleReactionRequest, ToggleReactionResponse,
};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Toggle an emoji reaction on a message
///
/// POST /messages/{message_id}/reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ToggleReactionRequest>,
) -> ApiResult<Json<ToggleReactionResponse>> {
    let result = ReactionService::new(state.service_context())
        .toggle(message_id, auth.user_id, request.emoji)
        .await?;
    Ok(Json(result))
}

/// Per-emoji reaction summary for a message
///
/// GET /messages/{message_id}/reactions
pub async fn get_reactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ReactionSummaryResponse>>> {
    let summaries = ReactionService::new(state.service_context())
        .summarize(message_id, auth.user_id)
        .await?;
    Ok(Json(summaries))
}
