//! In-memory implementations of the repository and collaborator ports,
//! letting the service suites drive the full pipeline hermetically.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use parley_core::{
    Call, CallRepository, CallStatus, Conversation, ConversationRepository, DomainError,
    DomainEvent, EventTransport, Message, MessagePage, MessageRepository, Participant,
    ParticipantRepository, PresenceStore, Reaction, ReactionRepository, RepoResult, User,
    UserRepository, VisibilityRepository,
};
use parley_service::ServiceContext;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    conversations: HashMap<Uuid, Conversation>,
    participants: Vec<Participant>,
    // (user_id, conversation_id) -> deleted_at
    markers: HashMap<(Uuid, Uuid), DateTime<Utc>>,
    messages: HashMap<Uuid, Message>,
    reactions: Vec<Reaction>,
    calls: HashMap<Uuid, Call>,
    online: HashSet<Uuid>,
}

/// Shared in-memory backend implementing every port
#[derive(Default)]
pub struct MemBackend {
    state: Mutex<State>,
}

impl MemBackend {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("backend mutex poisoned")
    }

    pub fn seed_user(&self, name: &str) -> User {
        let user = User::new(name.to_string());
        self.lock().users.insert(user.id, user.clone());
        user
    }

    /// Shift a message's creation time into the past
    pub fn backdate_message(&self, id: Uuid, by: Duration) {
        let mut state = self.lock();
        if let Some(message) = state.messages.get_mut(&id) {
            message.created_at -= by;
        }
    }

    /// Shift a call's creation time into the past
    pub fn backdate_call(&self, call_id: Uuid, by: Duration) {
        let mut state = self.lock();
        if let Some(call) = state.calls.get_mut(&call_id) {
            call.created_at -= by;
        }
    }

    pub fn message(&self, id: Uuid) -> Option<Message> {
        self.lock().messages.get(&id).cloned()
    }

    pub fn call(&self, call_id: Uuid) -> Option<Call> {
        self.lock().calls.get(&call_id).cloned()
    }

    pub fn has_marker(&self, conversation_id: Uuid, user_id: Uuid) -> bool {
        self.lock().markers.contains_key(&(user_id, conversation_id))
    }

    fn participant_set(state: &State, conversation_id: Uuid) -> Vec<Uuid> {
        state
            .participants
            .iter()
            .filter(|p| p.conversation_id == conversation_id)
            .map(|p| p.user_id)
            .collect()
    }
}

#[async_trait]
impl UserRepository for MemBackend {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn list_except(&self, user_id: Uuid) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|u| u.id != user_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        self.lock().users.insert(user.id, user.clone());
        Ok(())
    }

    async fn set_presence(
        &self,
        id: Uuid,
        is_online: bool,
        last_seen_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("User", id))?;
        user.is_online = is_online;
        user.last_seen_at = Some(last_seen_at);
        Ok(())
    }
}

#[async_trait]
impl ConversationRepository for MemBackend {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Conversation>> {
        Ok(self.lock().conversations.get(&id).cloned())
    }

    async fn find_or_create_direct(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> RepoResult<(Conversation, bool)> {
        let mut state = self.lock();

        let wanted: HashSet<Uuid> = [user_a, user_b].into_iter().collect();
        let existing = state
            .conversations
            .values()
            .find(|c| {
                !c.is_group
                    && MemBackend::participant_set(&state, c.id)
                        .into_iter()
                        .collect::<HashSet<_>>()
                        == wanted
            })
            .cloned();

        if let Some(conversation) = existing {
            return Ok((conversation, false));
        }

        let conversation = Conversation::new_direct(user_a);
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        for user_id in [user_a, user_b] {
            state
                .participants
                .push(Participant::new(conversation.id, user_id));
        }
        Ok((conversation, true))
    }

    async fn create_group(
        &self,
        conversation: &Conversation,
        member_ids: &[Uuid],
    ) -> RepoResult<()> {
        let mut state = self.lock();
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        for &user_id in member_ids {
            state
                .participants
                .push(Participant::new(conversation.id, user_id));
        }
        Ok(())
    }

    async fn find_visible_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Conversation>> {
        let state = self.lock();
        let mut conversations: Vec<Conversation> = state
            .conversations
            .values()
            .filter(|c| {
                state
                    .participants
                    .iter()
                    .any(|p| p.conversation_id == c.id && p.user_id == user_id)
                    && !state.markers.contains_key(&(user_id, c.id))
            })
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(conversations)
    }

    async fn find_deleted_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Conversation>> {
        let state = self.lock();
        Ok(state
            .conversations
            .values()
            .filter(|c| state.markers.contains_key(&(user_id, c.id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ParticipantRepository for MemBackend {
    async fn find(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<Option<Participant>> {
        Ok(self
            .lock()
            .participants
            .iter()
            .find(|p| p.conversation_id == conversation_id && p.user_id == user_id)
            .cloned())
    }

    async fn is_participant(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        Ok(self
            .lock()
            .participants
            .iter()
            .any(|p| p.conversation_id == conversation_id && p.user_id == user_id))
    }

    async fn participant_ids(&self, conversation_id: Uuid) -> RepoResult<Vec<Uuid>> {
        Ok(MemBackend::participant_set(&self.lock(), conversation_id))
    }

    async fn set_last_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut state = self.lock();
        if let Some(participant) = state
            .participants
            .iter_mut()
            .find(|p| p.conversation_id == conversation_id && p.user_id == user_id)
        {
            participant.last_read_at = Some(at);
        }
        Ok(())
    }

    async fn set_favorite(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        is_favorite: bool,
    ) -> RepoResult<()> {
        let mut state = self.lock();
        if let Some(participant) = state
            .participants
            .iter_mut()
            .find(|p| p.conversation_id == conversation_id && p.user_id == user_id)
        {
            participant.is_favorite = is_favorite;
        }
        Ok(())
    }
}

#[async_trait]
impl VisibilityRepository for MemBackend {
    async fn is_deleted_for(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        Ok(self.lock().markers.contains_key(&(user_id, conversation_id)))
    }

    async fn mark_deleted(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.lock()
            .markers
            .entry((user_id, conversation_id))
            .or_insert(at);
        Ok(())
    }

    async fn restore(&self, conversation_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        self.lock().markers.remove(&(user_id, conversation_id));
        Ok(())
    }

    async fn deleted_user_ids(&self, conversation_id: Uuid) -> RepoResult<Vec<Uuid>> {
        Ok(self
            .lock()
            .markers
            .keys()
            .filter(|(_, c)| *c == conversation_id)
            .map(|(u, _)| *u)
            .collect())
    }
}

#[async_trait]
impl MessageRepository for MemBackend {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>> {
        Ok(self.lock().messages.get(&id).cloned())
    }

    async fn create(&self, message: &Message) -> RepoResult<i64> {
        let mut state = self.lock();
        let conversation = state
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| DomainError::not_found("Conversation", message.conversation_id))?;
        conversation.last_message_at = Some(message.created_at);
        state.messages.insert(message.id, message.clone());
        Ok(state
            .messages
            .values()
            .filter(|m| m.conversation_id == message.conversation_id)
            .count() as i64)
    }

    async fn update_body(&self, id: Uuid, body: &str, edited_at: DateTime<Utc>) -> RepoResult<()> {
        let mut state = self.lock();
        let message = state
            .messages
            .get_mut(&id)
            .filter(|m| !m.is_deleted())
            .ok_or_else(|| DomainError::not_found("Message", id))?;
        message.body = Some(body.to_string());
        message.edited_at = Some(edited_at);
        Ok(())
    }

    async fn tombstone(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()> {
        let mut state = self.lock();
        let message = state
            .messages
            .get_mut(&id)
            .filter(|m| !m.is_deleted())
            .ok_or_else(|| DomainError::not_found("Message", id))?;
        message.tombstone(at);
        Ok(())
    }

    async fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut state = self.lock();
        let message = state
            .messages
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Message", id))?;
        if message.read_at.is_some() {
            return Ok(false);
        }
        message.read_at = Some(at);
        Ok(true)
    }

    async fn mark_unread_read(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Uuid>> {
        let mut state = self.lock();
        let mut ids = Vec::new();
        for message in state.messages.values_mut() {
            if message.conversation_id == conversation_id
                && message.author_id != reader_id
                && message.read_at.is_none()
                && !message.is_deleted()
            {
                message.read_at = Some(at);
                ids.push(message.id);
            }
        }
        Ok(ids)
    }

    async fn unread_count(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        last_read_at: Option<DateTime<Utc>>,
    ) -> RepoResult<i64> {
        let state = self.lock();
        Ok(state
            .messages
            .values()
            .filter(|m| {
                m.conversation_id == conversation_id
                    && m.author_id != user_id
                    && !m.is_deleted()
                    && last_read_at.is_none_or(|anchor| m.created_at > anchor)
            })
            .count() as i64)
    }

    async fn page(&self, conversation_id: Uuid, page: MessagePage) -> RepoResult<Vec<Message>> {
        let state = self.lock();
        let mut messages: Vec<Message> = state
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(messages
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect())
    }

    async fn latest(&self, conversation_id: Uuid) -> RepoResult<Option<Message>> {
        let state = self.lock();
        Ok(state
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .max_by_key(|m| (m.created_at, m.id))
            .cloned())
    }

    async fn search(
        &self,
        user_id: Uuid,
        query: &str,
        conversation_id: Option<Uuid>,
        limit: i64,
    ) -> RepoResult<Vec<Message>> {
        let state = self.lock();
        let needle = query.to_lowercase();
        let mut matches: Vec<Message> = state
            .messages
            .values()
            .filter(|m| {
                state
                    .participants
                    .iter()
                    .any(|p| p.conversation_id == m.conversation_id && p.user_id == user_id)
                    && !state.markers.contains_key(&(user_id, m.conversation_id))
                    && !m.is_deleted()
                    && conversation_id.is_none_or(|c| m.conversation_id == c)
                    && m.body
                        .as_deref()
                        .is_some_and(|b| b.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit as usize);
        Ok(matches)
    }
}

#[async_trait]
impl ReactionRepository for MemBackend {
    async fn find(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> RepoResult<Option<Reaction>> {
        Ok(self
            .lock()
            .reactions
            .iter()
            .find(|r| r.message_id == message_id && r.user_id == user_id && r.emoji == emoji)
            .cloned())
    }

    async fn find_by_message(&self, message_id: Uuid) -> RepoResult<Vec<Reaction>> {
        Ok(self
            .lock()
            .reactions
            .iter()
            .filter(|r| r.message_id == message_id)
            .cloned()
            .collect())
    }

    async fn create(&self, reaction: &Reaction) -> RepoResult<()> {
        let mut state = self.lock();
        let duplicate = state.reactions.iter().any(|r| {
            r.message_id == reaction.message_id
                && r.user_id == reaction.user_id
                && r.emoji == reaction.emoji
        });
        if !duplicate {
            state.reactions.push(reaction.clone());
        }
        Ok(())
    }

    async fn delete(&self, message_id: Uuid, user_id: Uuid, emoji: &str) -> RepoResult<()> {
        self.lock().reactions.retain(|r| {
            !(r.message_id == message_id && r.user_id == user_id && r.emoji == emoji)
        });
        Ok(())
    }
}

#[async_trait]
impl CallRepository for MemBackend {
    async fn find_by_token(&self, call_id: Uuid) -> RepoResult<Option<Call>> {
        Ok(self.lock().calls.get(&call_id).cloned())
    }

    async fn create(&self, call: &Call) -> RepoResult<()> {
        self.lock().calls.insert(call.call_id, call.clone());
        Ok(())
    }

    async fn find_active(&self, conversation_id: Uuid) -> RepoResult<Option<Call>> {
        Ok(self
            .lock()
            .calls
            .values()
            .filter(|c| c.conversation_id == conversation_id && !c.status.is_terminal())
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn purge_stale(
        &self,
        conversation_id: Uuid,
        cutoff: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let mut state = self.lock();
        let mut purged = 0;
        for call in state.calls.values_mut() {
            if call.conversation_id == conversation_id
                && !call.status.is_terminal()
                && call.created_at < cutoff
            {
                call.status = if call.status == CallStatus::Ringing {
                    CallStatus::Missed
                } else {
                    CallStatus::Ended
                };
                call.ended_at = Some(ended_at);
                purged += 1;
            }
        }
        Ok(purged)
    }

    async fn accept(&self, call_id: Uuid, started_at: DateTime<Utc>) -> RepoResult<bool> {
        let mut state = self.lock();
        let call = state
            .calls
            .get_mut(&call_id)
            .ok_or_else(|| DomainError::not_found("Call", call_id))?;
        if call.status != CallStatus::Ringing {
            return Ok(false);
        }
        call.status = CallStatus::Active;
        call.started_at = Some(started_at);
        Ok(true)
    }

    async fn finish(
        &self,
        call_id: Uuid,
        status: CallStatus,
        ended_at: Option<DateTime<Utc>>,
        duration_secs: Option<i64>,
    ) -> RepoResult<()> {
        let mut state = self.lock();
        let call = state
            .calls
            .get_mut(&call_id)
            .ok_or_else(|| DomainError::not_found("Call", call_id))?;
        call.status = status;
        call.ended_at = ended_at;
        call.duration_secs = duration_secs;
        Ok(())
    }

    async fn history(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Call>> {
        let state = self.lock();
        let mut calls: Vec<Call> = state
            .calls
            .values()
            .filter(|c| c.conversation_id == conversation_id && c.status == CallStatus::Ended)
            .cloned()
            .collect();
        calls.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
        Ok(calls
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl PresenceStore for MemBackend {
    async fn set_online(&self, user_id: Uuid) -> RepoResult<()> {
        self.lock().online.insert(user_id);
        Ok(())
    }

    async fn set_offline(&self, user_id: Uuid) -> RepoResult<()> {
        self.lock().online.remove(&user_id);
        Ok(())
    }

    async fn refresh(&self, _user_id: Uuid) -> RepoResult<()> {
        Ok(())
    }

    async fn is_online(&self, user_id: Uuid) -> RepoResult<bool> {
        Ok(self.lock().online.contains(&user_id))
    }
}

/// Transport double that records every publish
#[derive(Default)]
pub struct RecordingTransport {
    published: Mutex<Vec<(String, DomainEvent)>>,
}

impl RecordingTransport {
    /// Every (channel, event) pair published so far
    pub fn published(&self) -> Vec<(String, DomainEvent)> {
        self.published.lock().expect("transport mutex poisoned").clone()
    }

    /// Publishes of one event name
    pub fn named(&self, event_name: &str) -> Vec<(String, DomainEvent)> {
        self.published()
            .into_iter()
            .filter(|(_, e)| e.name() == event_name)
            .collect()
    }

    /// Channels that received a given event name
    pub fn channels_of(&self, event_name: &str) -> Vec<String> {
        self.named(event_name).into_iter().map(|(c, _)| c).collect()
    }

    pub fn clear(&self) {
        self.published.lock().expect("transport mutex poisoned").clear();
    }
}

#[async_trait]
impl EventTransport for RecordingTransport {
    async fn publish(&self, channel: &str, event: &DomainEvent) -> RepoResult<()> {
        self.published
            .lock()
            .expect("transport mutex poisoned")
            .push((channel.to_string(), event.clone()));
        Ok(())
    }
}

/// A fully wired in-memory service context
pub fn context() -> (ServiceContext, Arc<MemBackend>, Arc<RecordingTransport>) {
    let backend = Arc::new(MemBackend::default());
    let transport = Arc::new(RecordingTransport::default());

    let ctx = ServiceContext::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        transport.clone(),
    );

    (ctx, backend, transport)
}
