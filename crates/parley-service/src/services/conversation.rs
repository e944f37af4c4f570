//! Conversation service
//!
//! Creation and lookup of direct and group conversations. Direct (1:1)
//! creation is always a find-or-create over the unordered user pair; group
//! creation always makes a new row and never searches for an existing match.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use parley_core::events::{ConversationCreatedEvent, ConversationRestoredEvent};
use parley_core::{Conversation, DomainEvent};

use crate::dto::{ConversationResponse, CreateConversationRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::visibility::VisibilityService;

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a conversation from a request: group when `is_group`, else the
    /// unique direct conversation with the single listed user
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        creator_id: Uuid,
        request: CreateConversationRequest,
    ) -> ServiceResult<ConversationResponse> {
        let conversation = if request.is_group {
            self.create_group(creator_id, &request.user_ids, request.name)
                .await?
        } else {
            let &[other_id] = request.user_ids.as_slice() else {
                return Err(ServiceError::validation(
                    "a direct conversation takes exactly one other user",
                ));
            };
            self.find_or_create_direct(creator_id, other_id).await?
        };

        VisibilityService::new(self.ctx)
            .annotate(conversation, creator_id)
            .await
    }

    /// Find or create the direct conversation between two users
    ///
    /// Exactly one non-group conversation may exist per unordered pair. If it
    /// exists but the caller had hidden it, it is restored for the caller and
    /// a restoration event goes to all participants - the other party never
    /// lost visibility, but the broadcast guarantees consistent cached state
    /// on both sides. A clean existing conversation returns silently.
    #[instrument(skip(self))]
    pub async fn find_or_create_direct(
        &self,
        caller_id: Uuid,
        other_id: Uuid,
    ) -> ServiceResult<Conversation> {
        if caller_id == other_id {
            return Err(ServiceError::validation(
                "cannot open a conversation with yourself",
            ));
        }

        if self.ctx.user_repo().find_by_id(other_id).await?.is_none() {
            return Err(ServiceError::not_found("User", other_id));
        }

        let (conversation, created) = self
            .ctx
            .conversation_repo()
            .find_or_create_direct(caller_id, other_id)
            .await?;

        if created {
            info!(conversation_id = %conversation.id, "Direct conversation created");
            self.publish_created(&conversation).await?;
            return Ok(conversation);
        }

        if self
            .ctx
            .visibility_repo()
            .is_deleted_for(conversation.id, caller_id)
            .await?
        {
            self.ctx
                .visibility_repo()
                .restore(conversation.id, caller_id)
                .await?;

            info!(
                conversation_id = %conversation.id,
                user_id = %caller_id,
                "Direct conversation auto-restored on reopen"
            );

            let participant_ids = self
                .ctx
                .participant_repo()
                .participant_ids(conversation.id)
                .await?;

            self.ctx
                .fanout()
                .publish(DomainEvent::ConversationRestored(ConversationRestoredEvent {
                    conversation: conversation.clone(),
                    participant_ids,
                    restored_at: Utc::now(),
                }))
                .await;
        }

        Ok(conversation)
    }

    /// Create a group conversation. Groups are never deduplicated.
    #[instrument(skip(self, member_ids, name))]
    pub async fn create_group(
        &self,
        creator_id: Uuid,
        member_ids: &[Uuid],
        name: Option<String>,
    ) -> ServiceResult<Conversation> {
        let conversation = Conversation::new_group(creator_id, name);

        let mut members: Vec<Uuid> = Vec::with_capacity(member_ids.len() + 1);
        members.push(creator_id);
        for &id in member_ids {
            if !members.contains(&id) {
                members.push(id);
            }
        }

        self.ctx
            .conversation_repo()
            .create_group(&conversation, &members)
            .await?;

        info!(
            conversation_id = %conversation.id,
            members = members.len(),
            "Group conversation created"
        );

        self.publish_created(&conversation).await?;

        Ok(conversation)
    }

    /// Fetch a single conversation for a participant. Hidden conversations
    /// are returned too, so a restored thread can render immediately.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<ConversationResponse> {
        let visibility = VisibilityService::new(self.ctx);
        visibility.require_participant(conversation_id, user_id).await?;

        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id))?;

        visibility.annotate(conversation, user_id).await
    }

    /// Set the caller's favorite flag on a conversation
    #[instrument(skip(self))]
    pub async fn set_favorite(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        is_favorite: bool,
    ) -> ServiceResult<()> {
        VisibilityService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;

        self.ctx
            .participant_repo()
            .set_favorite(conversation_id, user_id, is_favorite)
            .await?;

        Ok(())
    }

    async fn publish_created(&self, conversation: &Conversation) -> ServiceResult<()> {
        let participant_ids = self
            .ctx
            .participant_repo()
            .participant_ids(conversation.id)
            .await?;

        self.ctx
            .fanout()
            .publish(DomainEvent::ConversationCreated(ConversationCreatedEvent {
                conversation: conversation.clone(),
                participant_ids,
                timestamp: Utc::now(),
            }))
            .await;

        Ok(())
    }
}
