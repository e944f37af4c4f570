//! User handlers

use axum::{extract::State, Json};
use parley_service::UserResponse;

use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// List every other user (contact picker)
///
/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .service_context()
        .user_repo()
        .list_except(auth.user_id)
        .await?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
