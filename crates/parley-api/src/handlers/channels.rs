//! Channel authorization handler
//!
//! The transport collaborator calls this before admitting a subscription.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use parley_cache::Channel;
use parley_service::authorize_channel;

use crate::extractors::AuthUser;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub channel: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub channel: String,
    pub authorized: bool,
}

/// Decide whether the caller may subscribe to a channel
///
/// GET /channels/authorize?channel=conversation.{id}
pub async fn authorize(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<AuthorizeParams>,
) -> ApiResult<Json<AuthorizeResponse>> {
    let channel = Channel::parse(&params.channel)
        .ok_or_else(|| ApiError::invalid_query("unknown channel name"))?;

    let authorized = authorize_channel(state.service_context(), auth.user_id, &channel).await?;

    Ok(Json(AuthorizeResponse {
        channel: params.channel,
        authorized,
    }))
}
