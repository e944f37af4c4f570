//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{
    calls, channels, conversations, health, messages, presence, reactions, users,
};
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(conversation_routes())
        .merge(message_routes())
        .merge(call_routes())
        .merge(presence_routes())
}

/// User routes
fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(users::list_users))
}

/// Conversation routes
fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations", post(conversations::create_conversation))
        .route(
            "/conversations/deleted",
            get(conversations::list_deleted_conversations),
        )
        .route(
            "/conversations/:conversation_id",
            get(conversations::get_conversation),
        )
        .route(
            "/conversations/:conversation_id",
            delete(conversations::delete_conversation),
        )
        .route(
            "/conversations/:conversation_id/restore",
            post(conversations::restore_conversation),
        )
        .route(
            "/conversations/:conversation_id/read",
            post(conversations::mark_conversation_read),
        )
        .route(
            "/conversations/:conversation_id/typing",
            post(conversations::typing),
        )
        .route(
            "/conversations/:conversation_id/favorite",
            put(conversations::set_favorite),
        )
        .route(
            "/conversations/:conversation_id/messages",
            get(messages::get_messages),
        )
        .route(
            "/conversations/:conversation_id/calls",
            get(calls::call_history),
        )
        .route(
            "/conversations/:conversation_id/calls/active",
            get(calls::active_call),
        )
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages/search", get(messages::search_messages))
        .route("/messages/:message_id", patch(messages::update_message))
        .route("/messages/:message_id", delete(messages::delete_message))
        .route(
            "/messages/:message_id/read",
            post(messages::mark_message_read),
        )
        .route(
            "/messages/:message_id/reactions",
            post(reactions::toggle_reaction),
        )
        .route(
            "/messages/:message_id/reactions",
            get(reactions::get_reactions),
        )
}

/// Call signaling routes
fn call_routes() -> Router<AppState> {
    Router::new()
        .route("/calls", post(calls::initiate_call))
        .route("/calls/:call_id/accept", post(calls::accept_call))
        .route("/calls/:call_id/reject", post(calls::reject_call))
        .route("/calls/:call_id/end", post(calls::end_call))
        .route("/calls/:call_id/signal", post(calls::signal))
}

/// Presence and channel-authorization routes
fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/presence/online", post(presence::online))
        .route("/presence/offline", post(presence::offline))
        .route("/presence/heartbeat", post(presence::heartbeat))
        .route("/channels/authorize", get(channels::authorize))
}
