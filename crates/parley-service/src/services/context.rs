//! Service context - dependency container for services
//!
//! Holds the repository ports, the presence cache, and the fan-out router.
//! Everything is behind a trait object so the same services run against
//! PostgreSQL/Redis in production and in-memory doubles in tests.

use std::sync::Arc;

use parley_core::{
    CallRepository, ConversationRepository, EventTransport, MessageRepository,
    ParticipantRepository, PresenceStore, ReactionRepository, UserRepository,
    VisibilityRepository,
};

use super::fanout::FanoutRouter;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,
    visibility_repo: Arc<dyn VisibilityRepository>,
    message_repo: Arc<dyn MessageRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    call_repo: Arc<dyn CallRepository>,
    presence_store: Arc<dyn PresenceStore>,
    fanout: FanoutRouter,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        conversation_repo: Arc<dyn ConversationRepository>,
        participant_repo: Arc<dyn ParticipantRepository>,
        visibility_repo: Arc<dyn VisibilityRepository>,
        message_repo: Arc<dyn MessageRepository>,
        reaction_repo: Arc<dyn ReactionRepository>,
        call_repo: Arc<dyn CallRepository>,
        presence_store: Arc<dyn PresenceStore>,
        transport: Arc<dyn EventTransport>,
    ) -> Self {
        Self {
            user_repo,
            conversation_repo,
            participant_repo,
            visibility_repo,
            message_repo,
            reaction_repo,
            call_repo,
            presence_store,
            fanout: FanoutRouter::new(transport),
        }
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the conversation repository
    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    /// Get the participant repository
    pub fn participant_repo(&self) -> &dyn ParticipantRepository {
        self.participant_repo.as_ref()
    }

    /// Get the visibility (deletion marker) repository
    pub fn visibility_repo(&self) -> &dyn VisibilityRepository {
        self.visibility_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    /// Get the reaction repository
    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    /// Get the call repository
    pub fn call_repo(&self) -> &dyn CallRepository {
        self.call_repo.as_ref()
    }

    /// Get the presence cache
    pub fn presence_store(&self) -> &dyn PresenceStore {
        self.presence_store.as_ref()
    }

    /// Get the fan-out router
    pub fn fanout(&self) -> &FanoutRouter {
        &self.fanout
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("presence_store", &"...")
            .field("fanout", &"FanoutRouter")
            .finish()
    }
}
