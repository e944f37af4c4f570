//! Presence service
//!
//! Login/logout/heartbeat update durable presence alongside the process-wide
//! cache, and broadcast status on the shared presence channel. Typing
//! indicators are pure fan-out - nothing is persisted.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use parley_core::events::{UserStatusUpdatedEvent, UserTypingEvent};
use parley_core::DomainEvent;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::visibility::VisibilityService;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark a user online (login / transport connect)
    #[instrument(skip(self))]
    pub async fn connected(&self, user_id: Uuid) -> ServiceResult<()> {
        let now = Utc::now();

        self.ctx
            .user_repo()
            .set_presence(user_id, true, now)
            .await?;
        self.ctx.presence_store().set_online(user_id).await?;

        info!(user_id = %user_id, "User online");

        self.ctx
            .fanout()
            .publish(DomainEvent::UserStatusUpdated(UserStatusUpdatedEvent {
                user_id,
                is_online: true,
                last_seen_at: now,
            }))
            .await;

        Ok(())
    }

    /// Mark a user offline (logout / transport disconnect)
    #[instrument(skip(self))]
    pub async fn disconnected(&self, user_id: Uuid) -> ServiceResult<()> {
        let now = Utc::now();

        self.ctx
            .user_repo()
            .set_presence(user_id, false, now)
            .await?;
        self.ctx.presence_store().set_offline(user_id).await?;

        info!(user_id = %user_id, "User offline");

        self.ctx
            .fanout()
            .publish(DomainEvent::UserStatusUpdated(UserStatusUpdatedEvent {
                user_id,
                is_online: false,
                last_seen_at: now,
            }))
            .await;

        Ok(())
    }

    /// Heartbeat: refresh the cache TTL and the durable last-seen stamp.
    /// No broadcast - nothing observable changed.
    #[instrument(skip(self))]
    pub async fn heartbeat(&self, user_id: Uuid) -> ServiceResult<()> {
        self.ctx.presence_store().refresh(user_id).await?;
        self.ctx
            .user_repo()
            .set_presence(user_id, true, Utc::now())
            .await?;
        Ok(())
    }

    /// Relay a typing indicator to the conversation's presence channel
    #[instrument(skip(self))]
    pub async fn typing(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        is_typing: bool,
    ) -> ServiceResult<()> {
        VisibilityService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;

        self.ctx
            .fanout()
            .publish(DomainEvent::UserTyping(UserTypingEvent {
                conversation_id,
                user_id,
                is_typing,
            }))
            .await;

        Ok(())
    }
}
