//! Error handling utilities for repositories

use parley_core::DomainError;
use sqlx::Error as SqlxError;
use uuid::Uuid;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::Database(e.to_string())
}

/// Create a "conversation not found" error
pub fn conversation_not_found(id: Uuid) -> DomainError {
    DomainError::not_found("Conversation", id)
}

/// Create a "message not found" error
pub fn message_not_found(id: Uuid) -> DomainError {
    DomainError::not_found("Message", id)
}

/// Create a "call not found" error
pub fn call_not_found(call_id: Uuid) -> DomainError {
    DomainError::not_found("Call", call_id)
}

/// Create a "user not found" error
pub fn user_not_found(id: Uuid) -> DomainError {
    DomainError::not_found("User", id)
}
