//! Presence handlers
//!
//! Connect/disconnect are driven by the transport collaborator's session
//! lifecycle; heartbeat keeps the cache entry alive in between.

use axum::extract::State;

use parley_service::PresenceService;

use crate::extractors::AuthUser;
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Mark the caller online
///
/// POST /presence/online
pub async fn online(State(state): State<AppState>, auth: AuthUser) -> ApiResult<NoContent> {
    PresenceService::new(state.service_context())
        .connected(auth.user_id)
        .await?;
    Ok(NoContent)
}

/// Mark the caller offline
///
/// POST /presence/offline
pub async fn offline(State(state): State<AppState>, auth: AuthUser) -> ApiResult<NoContent> {
    PresenceService::new(state.service_context())
        .disconnected(auth.user_id)
        .await?;
    Ok(NoContent)
}

/// Refresh the caller's presence TTL
///
/// POST /presence/heartbeat
pub async fn heartbeat(State(state): State<AppState>, auth: AuthUser) -> ApiResult<NoContent> {
    PresenceService::new(state.service_context())
        .heartbeat(auth.user_id)
        .await?;
    Ok(NoContent)
}
