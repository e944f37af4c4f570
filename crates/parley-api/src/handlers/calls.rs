//! Call signaling handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use parley_service::{CallResponse, CallService, InitiateCallRequest, SignalRequest};

use crate::extractors::AuthUser;
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Start ringing the receiver
///
/// POST /calls
pub async fn initiate_call(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<InitiateCallRequest>,
) -> ApiResult<Created<Json<CallResponse>>> {
    let call = CallService::new(state.service_context())
        .initiate(auth.user_id, request.conversation_id, request.receiver_id)
        .await?;
    Ok(Created(Json(call)))
}

/// Accept a ringing call
///
/// POST /calls/{call_id}/accept
pub async fn accept_call(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(call_id): Path<Uuid>,
) -> ApiResult<Json<CallResponse>> {
    let call = CallService::new(state.service_context())
        .accept(call_id, auth.user_id)
        .await?;
    Ok(Json(call))
}

/// Reject a call
///
/// POST /calls/{call_id}/reject
pub async fn reject_call(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(call_id): Path<Uuid>,
) -> ApiResult<Json<CallResponse>> {
    let call = CallService::new(state.service_context())
        .reject(call_id, auth.user_id)
        .await?;
    Ok(Json(call))
}

/// End a call
///
/// POST /calls/{call_id}/end
pub async fn end_call(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(call_id): Path<Uuid>,
) -> ApiResult<Json<CallResponse>> {
    let call = CallService::new(state.service_context())
        .end(call_id, auth.user_id)
        .await?;
    Ok(Json(call))
}

/// Relay a WebRTC signal to the other party
///
/// POST /calls/{call_id}/signal
pub async fn signal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(call_id): Path<Uuid>,
    Json(request): Json<SignalRequest>,
) -> ApiResult<NoContent> {
    CallService::new(state.service_context())
        .signal(call_id, auth.user_id, request)
        .await?;
    Ok(NoContent)
}

/// The conversation's current non-terminal call, if any
///
/// GET /conversations/{conversation_id}/calls/active
pub async fn active_call(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<Option<CallResponse>>> {
    let call = CallService::new(state.service_context())
        .active_call(conversation_id, auth.user_id)
        .await?;
    Ok(Json(call))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub page: Option<i64>,
}

/// Ended calls of a conversation, newest first
///
/// GET /conversations/{conversation_id}/calls
pub async fn call_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<CallResponse>>> {
    let calls = CallService::new(state.service_context())
        .history(conversation_id, auth.user_id, params.page.unwrap_or(1))
        .await?;
    Ok(Json(calls))
}
