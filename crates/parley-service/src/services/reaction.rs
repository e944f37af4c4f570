//! Reaction service
//!
//! Toggle semantics over the unique (message, user, emoji) triple: an
//! existing reaction is removed, a missing one is added. Two toggles always
//! return to the original state.

use tracing::{info, instrument};
use uuid::Uuid;

use parley_core::events::{ReactionAddedEvent, ReactionRemovedEvent};
use parley_core::{DomainError, DomainEvent, Reaction, ReactionSummary};

use crate::dto::{ReactionSummaryResponse, ToggleAction, ToggleReactionResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Toggle a reaction on a message
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        emoji: String,
    ) -> ServiceResult<ToggleReactionResponse> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id))?;

        if !self
            .ctx
            .participant_repo()
            .is_participant(message.conversation_id, user_id)
            .await?
        {
            return Err(
                DomainError::Forbidden("only participants may react to a message").into(),
            );
        }

        let existing = self
            .ctx
            .reaction_repo()
            .find(message_id, user_id, &emoji)
            .await?;

        let action = if existing.is_some() {
            self.ctx
                .reaction_repo()
                .delete(message_id, user_id, &emoji)
                .await?;

            info!(message_id = %message_id, emoji = %emoji, "Reaction removed");

            self.ctx
                .fanout()
                .publish(DomainEvent::ReactionRemoved(ReactionRemovedEvent {
                    conversation_id: message.conversation_id,
                    message_id,
                    user_id,
                    emoji: emoji.clone(),
                }))
                .await;

            ToggleAction::Removed
        } else {
            let reaction = Reaction::new(message_id, user_id, emoji.clone());
            self.ctx.reaction_repo().create(&reaction).await?;

            info!(message_id = %message_id, emoji = %emoji, "Reaction added");

            self.ctx
                .fanout()
                .publish(DomainEvent::ReactionAdded(ReactionAddedEvent {
                    conversation_id: message.conversation_id,
                    reaction,
                }))
                .await;

            ToggleAction::Added
        };

        Ok(ToggleReactionResponse {
            action,
            message_id,
            user_id,
            emoji,
        })
    }

    /// Per-emoji summaries for a message
    #[instrument(skip(self))]
    pub async fn summarize(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Vec<ReactionSummaryResponse>> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id))?;

        if !self
            .ctx
            .participant_repo()
            .is_participant(message.conversation_id, user_id)
            .await?
        {
            return Err(
                DomainError::Forbidden("only participants may view reactions").into(),
            );
        }

        let reactions = self.ctx.reaction_repo().find_by_message(message_id).await?;
        Ok(ReactionSummary::group(&reactions)
            .into_iter()
            .map(Into::into)
            .collect())
    }
}
