//! Visibility engine
//!
//! Computes, per user, which conversations are visible given the
//! soft-delete/restore markers. Deleting never destroys data and never
//! affects other participants; restoring only removes the caller's marker.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use parley_core::events::{ConversationDeletedEvent, ConversationRestoredEvent};
use parley_core::{Conversation, DomainError, DomainEvent};

use crate::dto::{ConversationResponse, MessageResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Visibility engine
pub struct VisibilityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VisibilityService<'a> {
    /// Create a new VisibilityService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// A conversation is visible to a user iff they participate and hold no
    /// deletion marker
    #[instrument(skip(self))]
    pub async fn is_visible(&self, conversation_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        if !self
            .ctx
            .participant_repo()
            .is_participant(conversation_id, user_id)
            .await?
        {
            return Ok(false);
        }
        let deleted = self
            .ctx
            .visibility_repo()
            .is_deleted_for(conversation_id, user_id)
            .await?;
        Ok(!deleted)
    }

    /// All conversations visible to the user, last activity first, each
    /// annotated with its unread count
    #[instrument(skip(self))]
    pub async fn list_visible(&self, user_id: Uuid) -> ServiceResult<Vec<ConversationResponse>> {
        let conversations = self
            .ctx
            .conversation_repo()
            .find_visible_for_user(user_id)
            .await?;

        let mut responses = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            responses.push(self.annotate(conversation, user_id).await?);
        }
        Ok(responses)
    }

    /// The user's hidden conversations
    #[instrument(skip(self))]
    pub async fn list_deleted(&self, user_id: Uuid) -> ServiceResult<Vec<ConversationResponse>> {
        let conversations = self
            .ctx
            .conversation_repo()
            .find_deleted_for_user(user_id)
            .await?;

        let mut responses = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            responses.push(self.annotate(conversation, user_id).await?);
        }
        Ok(responses)
    }

    /// Hide a conversation for one user. Idempotent.
    #[instrument(skip(self))]
    pub async fn mark_deleted(&self, conversation_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        self.require_participant(conversation_id, user_id).await?;

        let now = Utc::now();
        self.ctx
            .visibility_repo()
            .mark_deleted(conversation_id, user_id, now)
            .await?;

        info!(conversation_id = %conversation_id, user_id = %user_id, "Conversation hidden");

        self.ctx
            .fanout()
            .publish(DomainEvent::ConversationDeleted(ConversationDeletedEvent {
                conversation_id,
                user_id,
                deleted_at: now,
            }))
            .await;

        Ok(())
    }

    /// Remove the user's deletion marker and resurface the thread for
    /// everyone, so all clients re-fetch consistent state. Idempotent.
    #[instrument(skip(self))]
    pub async fn restore(&self, conversation_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        self.require_participant(conversation_id, user_id).await?;

        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id))?;

        self.ctx
            .visibility_repo()
            .restore(conversation_id, user_id)
            .await?;

        info!(conversation_id = %conversation_id, user_id = %user_id, "Conversation restored");

        let participant_ids = self
            .ctx
            .participant_repo()
            .participant_ids(conversation_id)
            .await?;

        self.ctx
            .fanout()
            .publish(DomainEvent::ConversationRestored(ConversationRestoredEvent {
                conversation,
                participant_ids,
                restored_at: Utc::now(),
            }))
            .await;

        Ok(())
    }

    /// Annotate a conversation with the viewer's sidebar data
    pub(crate) async fn annotate(
        &self,
        conversation: Conversation,
        user_id: Uuid,
    ) -> ServiceResult<ConversationResponse> {
        let participant = self
            .ctx
            .participant_repo()
            .find(conversation.id, user_id)
            .await?;

        let (last_read_at, is_favorite) = participant
            .map(|p| (p.last_read_at, p.is_favorite))
            .unwrap_or((None, false));

        let unread_count = self
            .ctx
            .message_repo()
            .unread_count(conversation.id, user_id, last_read_at)
            .await?;

        let latest_message = self
            .ctx
            .message_repo()
            .latest(conversation.id)
            .await?
            .map(MessageResponse::from);

        let participant_ids = self
            .ctx
            .participant_repo()
            .participant_ids(conversation.id)
            .await?;
        let mut participants = Vec::with_capacity(participant_ids.len());
        for id in participant_ids {
            if let Some(user) = self.ctx.user_repo().find_by_id(id).await? {
                participants.push(UserResponse::from(&user));
            }
        }

        Ok(ConversationResponse::new(
            conversation,
            participants,
            latest_message,
            unread_count,
            is_favorite,
        ))
    }

    pub(crate) async fn require_participant(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<()> {
        if !self
            .ctx
            .participant_repo()
            .is_participant(conversation_id, user_id)
            .await?
        {
            return Err(DomainError::NotAParticipant {
                conversation_id,
                user_id,
            }
            .into());
        }
        Ok(())
    }
}
