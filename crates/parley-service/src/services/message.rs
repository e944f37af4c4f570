//! Message pipeline
//!
//! Validates, persists, and fans out messages, edits, deletions, read
//! receipts, and unread counts. Per message the state machine is
//! `created → edited (window-gated) → soft-deleted`, with no way out of
//! soft-deleted.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use parley_core::events::{
    ConversationCreatedEvent, ConversationReadEvent, ConversationRestoredEvent,
    MessageDeletedEvent, MessageReadEvent, MessageSentEvent, MessageUpdatedEvent,
};
use parley_core::{
    DomainError, DomainEvent, Message, MessagePage, ReactionSummary, EDIT_WINDOW,
};

use crate::dto::{MessageResponse, SendMessageRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::visibility::VisibilityService;

/// Cap on search results
const SEARCH_LIMIT: i64 = 50;

/// Message pipeline
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message
    ///
    /// The message is persisted unread and bumps the conversation's last
    /// activity. A new message revives the conversation for any other
    /// participant who had hidden it (one restoration broadcast per
    /// triggering message, however many markers were cleared), and the very
    /// first message additionally announces the conversation itself, covering
    /// clients that have no record of it yet.
    #[instrument(skip(self, request))]
    pub async fn send(
        &self,
        author_id: Uuid,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let conversation_id = request.conversation_id;

        VisibilityService::new(self.ctx)
            .require_participant(conversation_id, author_id)
            .await?;

        if request.body.as_deref().unwrap_or("").trim().is_empty()
            && request.attachments.is_empty()
        {
            return Err(ServiceError::validation(
                "a message needs a body or at least one attachment",
            ));
        }

        let message = Message::new(
            conversation_id,
            author_id,
            request.body.filter(|b| !b.is_empty()),
            request.attachments.into_iter().map(Into::into).collect(),
        );

        let total_in_conversation = self.ctx.message_repo().create(&message).await?;

        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            "Message sent"
        );

        let participant_ids = self
            .ctx
            .participant_repo()
            .participant_ids(conversation_id)
            .await?;

        self.restore_hidden_for_others(conversation_id, author_id, &participant_ids)
            .await?;

        if total_in_conversation == 1 {
            if let Some(conversation) = self
                .ctx
                .conversation_repo()
                .find_by_id(conversation_id)
                .await?
            {
                self.ctx
                    .fanout()
                    .publish(DomainEvent::ConversationCreated(ConversationCreatedEvent {
                        conversation,
                        participant_ids: participant_ids.clone(),
                        timestamp: Utc::now(),
                    }))
                    .await;
            }
        }

        self.ctx
            .fanout()
            .publish(DomainEvent::MessageSent(MessageSentEvent {
                message: message.clone(),
                participant_ids,
            }))
            .await;

        Ok(MessageResponse::from(message))
    }

    /// Edit a message body. Author only, within the edit window, and never on
    /// a tombstone. The event carries the previous body.
    #[instrument(skip(self, new_body))]
    pub async fn edit(
        &self,
        message_id: Uuid,
        editor_id: Uuid,
        new_body: String,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.find_message(message_id).await?;

        if message.author_id != editor_id {
            return Err(DomainError::Forbidden("only the author may edit a message").into());
        }
        if message.is_deleted() {
            return Err(DomainError::InvalidState("cannot edit a deleted message").into());
        }

        let now = Utc::now();
        if !message.is_editable_at(now) {
            return Err(DomainError::EditWindowExpired {
                window_minutes: EDIT_WINDOW.num_minutes(),
            }
            .into());
        }

        let previous_body = message.body.clone();

        self.ctx
            .message_repo()
            .update_body(message_id, &new_body, now)
            .await?;
        message.body = Some(new_body);
        message.edited_at = Some(now);

        info!(message_id = %message_id, "Message edited");

        self.ctx
            .fanout()
            .publish(DomainEvent::MessageUpdated(MessageUpdatedEvent {
                message: message.clone(),
                previous_body,
            }))
            .await;

        Ok(MessageResponse::from(message))
    }

    /// Tombstone a message. Author only. Id and timestamps survive so
    /// ordering stays stable; body and attachments are gone.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, message_id: Uuid, requester_id: Uuid) -> ServiceResult<()> {
        let message = self.find_message(message_id).await?;

        if message.author_id != requester_id {
            return Err(DomainError::Forbidden("only the author may delete a message").into());
        }
        if message.is_deleted() {
            return Err(DomainError::InvalidState("message is already deleted").into());
        }

        let now = Utc::now();
        self.ctx.message_repo().tombstone(message_id, now).await?;

        info!(message_id = %message_id, "Message deleted");

        self.ctx
            .fanout()
            .publish(DomainEvent::MessageDeleted(MessageDeletedEvent {
                message_id,
                conversation_id: message.conversation_id,
                author_id: message.author_id,
                deleted_at: now,
            }))
            .await;

        Ok(())
    }

    /// Stamp a read receipt on one message
    ///
    /// Reading your own message is a no-op, not an error, and so is a
    /// message that is already read - only a genuine transition emits an
    /// event.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, message_id: Uuid, reader_id: Uuid) -> ServiceResult<()> {
        let message = self.find_message(message_id).await?;

        if message.author_id == reader_id {
            return Ok(());
        }

        let now = Utc::now();
        let stamped = self.ctx.message_repo().mark_read(message_id, now).await?;
        if !stamped {
            return Ok(());
        }

        self.ctx
            .fanout()
            .publish(DomainEvent::MessageRead(MessageReadEvent {
                conversation_id: message.conversation_id,
                message_id,
                reader_id,
                read_at: now,
            }))
            .await;

        Ok(())
    }

    /// Advance the reader's last-read anchor and stamp every currently
    /// unread foreign message in one pass
    #[instrument(skip(self))]
    pub async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
    ) -> ServiceResult<()> {
        VisibilityService::new(self.ctx)
            .require_participant(conversation_id, reader_id)
            .await?;

        let now = Utc::now();
        self.ctx
            .participant_repo()
            .set_last_read(conversation_id, reader_id, now)
            .await?;

        let message_ids = self
            .ctx
            .message_repo()
            .mark_unread_read(conversation_id, reader_id, now)
            .await?;

        if !message_ids.is_empty() {
            self.ctx
                .fanout()
                .publish(DomainEvent::ConversationRead(ConversationReadEvent {
                    conversation_id,
                    reader_id,
                    message_ids,
                    read_at: now,
                }))
                .await;
        }

        Ok(())
    }

    /// One page of a conversation's messages
    ///
    /// Fetched newest-first so page boundaries stay put under concurrent
    /// inserts, then reversed so the caller can append chronologically.
    #[instrument(skip(self))]
    pub async fn page(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        page: MessagePage,
    ) -> ServiceResult<Vec<MessageResponse>> {
        VisibilityService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;

        let mut messages = self.ctx.message_repo().page(conversation_id, page).await?;
        messages.reverse();

        let mut responses = Vec::with_capacity(messages.len());
        for message in messages {
            let reactions = self
                .ctx
                .reaction_repo()
                .find_by_message(message.id)
                .await?;
            responses.push(MessageResponse::new(
                message,
                ReactionSummary::group(&reactions),
            ));
        }

        Ok(responses)
    }

    /// Substring search over the caller's visible conversations
    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        user_id: Uuid,
        query: &str,
        conversation_id: Option<Uuid>,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let messages = self
            .ctx
            .message_repo()
            .search(user_id, query, conversation_id, SEARCH_LIMIT)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    /// Restore the conversation for every *other* participant who had hidden
    /// it. However many markers get cleared, exactly one restoration
    /// broadcast goes out for the triggering message.
    async fn restore_hidden_for_others(
        &self,
        conversation_id: Uuid,
        author_id: Uuid,
        participant_ids: &[Uuid],
    ) -> ServiceResult<()> {
        let hidden = self
            .ctx
            .visibility_repo()
            .deleted_user_ids(conversation_id)
            .await?;

        let mut restored_any = false;
        for user_id in hidden {
            if user_id == author_id {
                continue;
            }
            self.ctx
                .visibility_repo()
                .restore(conversation_id, user_id)
                .await?;
            restored_any = true;
        }

        if restored_any {
            if let Some(conversation) = self
                .ctx
                .conversation_repo()
                .find_by_id(conversation_id)
                .await?
            {
                info!(conversation_id = %conversation_id, "Conversation revived by new message");
                self.ctx
                    .fanout()
                    .publish(DomainEvent::ConversationRestored(ConversationRestoredEvent {
                        conversation,
                        participant_ids: participant_ids.to_vec(),
                        restored_at: Utc::now(),
                    }))
                    .await;
            }
        }

        Ok(())
    }

    async fn find_message(&self, message_id: Uuid) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id))
    }
}
