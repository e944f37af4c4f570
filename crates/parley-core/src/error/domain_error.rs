//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("User {user_id} is not a participant of conversation {conversation_id}")]
    NotAParticipant {
        conversation_id: Uuid,
        user_id: Uuid,
    },

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    // =========================================================================
    // State Machine Errors
    // =========================================================================
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Invalid signaling target")]
    InvalidTarget,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Messages may only be edited within {window_minutes} minutes of sending")]
    EditWindowExpired { window_minutes: i64 },

    #[error("A call is already in progress for this conversation")]
    CallInProgress,

    #[error("Malformed signaling payload: {0}")]
    MalformedPayload(String),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a "not found" error
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAParticipant { .. } => "NOT_A_PARTICIPANT",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::EditWindowExpired { .. } => "EDIT_WINDOW_EXPIRED",
            Self::CallInProgress => "CALL_IN_PROGRESS",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAParticipant { .. } | Self::Forbidden(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::InvalidState(_) | Self::CallInProgress)
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MalformedPayload(_) | Self::InvalidTarget)
    }

    /// Get the HTTP status code equivalent for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotAParticipant { .. } | Self::Forbidden(_) | Self::EditWindowExpired { .. } => {
                403
            }
            Self::InvalidState(_) | Self::CallInProgress => 409,
            Self::InvalidTarget => 403,
            Self::MalformedPayload(_) => 422,
            Self::NotFound { .. } => 404,
            Self::Database(_) | Self::Cache(_) | Self::Internal(_) => 500,
        }
    }
}
