//! Call signaling state machine
//!
//! Lifecycle: `ringing → active → ended`, with `ringing → rejected` and the
//! expiry path to `missed`. One non-terminal call per conversation;
//! staleness is checked opportunistically at `initiate`, not by a background
//! sweep. WebRTC payloads are validated (offer/answer only) and relayed
//! verbatim - never interpreted, never stored.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use parley_core::events::{
    CallAcceptedEvent, CallEndedEvent, CallInitiatedEvent, CallRejectedEvent, WebRtcSignalEvent,
};
use parley_core::signaling::validate_session_description;
use parley_core::{Call, CallStatus, DomainError, DomainEvent, CALL_STALE_AFTER};

use crate::dto::{CallResponse, SignalRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::visibility::VisibilityService;

/// Page size for call history
const HISTORY_PAGE_SIZE: i64 = 10;

/// Call signaling service
pub struct CallService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CallService<'a> {
    /// Create a new CallService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start ringing the receiver
    ///
    /// Both parties must participate in the conversation. Abandoned
    /// non-terminal calls older than the staleness threshold are purged
    /// first; a live one blocks with `CallInProgress`. Only the receiver is
    /// notified.
    #[instrument(skip(self))]
    pub async fn initiate(
        &self,
        caller_id: Uuid,
        conversation_id: Uuid,
        receiver_id: Uuid,
    ) -> ServiceResult<CallResponse> {
        if caller_id == receiver_id {
            return Err(DomainError::InvalidTarget.into());
        }

        let participant_repo = self.ctx.participant_repo();
        for user_id in [caller_id, receiver_id] {
            if !participant_repo
                .is_participant(conversation_id, user_id)
                .await?
            {
                return Err(DomainError::InvalidTarget.into());
            }
        }

        let now = Utc::now();
        let purged = self
            .ctx
            .call_repo()
            .purge_stale(conversation_id, now - CALL_STALE_AFTER, now)
            .await?;
        if purged > 0 {
            info!(conversation_id = %conversation_id, purged, "Purged abandoned calls");
        }

        if self
            .ctx
            .call_repo()
            .find_active(conversation_id)
            .await?
            .is_some()
        {
            return Err(DomainError::CallInProgress.into());
        }

        let call = Call::new(conversation_id, caller_id, receiver_id);
        self.ctx.call_repo().create(&call).await?;

        info!(
            call_id = %call.call_id,
            caller_id = %caller_id,
            receiver_id = %receiver_id,
            "Call initiated"
        );

        self.ctx
            .fanout()
            .publish(DomainEvent::CallInitiated(CallInitiatedEvent {
                call: call.clone(),
            }))
            .await;

        Ok(CallResponse::from(call))
    }

    /// Receiver picks up: ringing → active
    #[instrument(skip(self))]
    pub async fn accept(&self, call_id: Uuid, by_user: Uuid) -> ServiceResult<CallResponse> {
        let call = self.find_call(call_id).await?;

        if call.receiver_id != by_user {
            return Err(DomainError::Forbidden("only the receiver may accept a call").into());
        }

        let started_at = Utc::now();
        // The repository guards the transition; a lost race against another
        // accept or a reject surfaces as InvalidState.
        if !self.ctx.call_repo().accept(call_id, started_at).await? {
            return Err(DomainError::InvalidState("call is no longer ringing").into());
        }

        let mut call = call;
        call.status = CallStatus::Active;
        call.started_at = Some(started_at);

        info!(call_id = %call_id, "Call accepted");

        self.ctx
            .fanout()
            .publish(DomainEvent::CallAccepted(CallAcceptedEvent {
                call: call.clone(),
            }))
            .await;

        Ok(CallResponse::from(call))
    }

    /// Receiver declines. No state guard beyond receiver identity.
    #[instrument(skip(self))]
    pub async fn reject(&self, call_id: Uuid, by_user: Uuid) -> ServiceResult<CallResponse> {
        let mut call = self.find_call(call_id).await?;

        if call.receiver_id != by_user {
            return Err(DomainError::Forbidden("only the receiver may reject a call").into());
        }

        self.ctx
            .call_repo()
            .finish(call_id, CallStatus::Rejected, None, None)
            .await?;
        call.status = CallStatus::Rejected;

        info!(call_id = %call_id, "Call rejected");

        self.ctx
            .fanout()
            .publish(DomainEvent::CallRejected(CallRejectedEvent {
                call: call.clone(),
            }))
            .await;

        Ok(CallResponse::from(call))
    }

    /// Either party hangs up. Duration is measured from `started_at` when
    /// the call ever went active, else null.
    #[instrument(skip(self))]
    pub async fn end(&self, call_id: Uuid, by_user: Uuid) -> ServiceResult<CallResponse> {
        let mut call = self.find_call(call_id).await?;

        if !call.involves(by_user) {
            return Err(DomainError::Forbidden("not a party to this call").into());
        }

        let ended_at = Utc::now();
        let duration_secs = call
            .started_at
            .map(|started| (ended_at - started).num_seconds());

        self.ctx
            .call_repo()
            .finish(call_id, CallStatus::Ended, Some(ended_at), duration_secs)
            .await?;
        call.status = CallStatus::Ended;
        call.ended_at = Some(ended_at);
        call.duration_secs = duration_secs;

        info!(call_id = %call_id, duration_secs = ?duration_secs, "Call ended");

        self.ctx
            .fanout()
            .publish(DomainEvent::CallEnded(CallEndedEvent {
                call: call.clone(),
                ended_by: by_user,
            }))
            .await;

        Ok(CallResponse::from(call))
    }

    /// Relay a WebRTC signal to the other call party
    #[instrument(skip(self, request))]
    pub async fn signal(
        &self,
        call_id: Uuid,
        by_user: Uuid,
        request: SignalRequest,
    ) -> ServiceResult<()> {
        let call = self.find_call(call_id).await?;

        if !call.involves(by_user) {
            return Err(DomainError::Forbidden("not a party to this call").into());
        }

        // The target must be the counterpart of the sender
        if call.other_party(by_user) != Some(request.target_user_id) {
            return Err(DomainError::InvalidTarget.into());
        }

        if request.signal_type.carries_session_description() {
            validate_session_description(request.signal_type, &request.payload)?;
        }

        info!(
            call_id = %call_id,
            signal = ?request.signal_type,
            to_user = %request.target_user_id,
            "Relaying WebRTC signal"
        );

        self.ctx
            .fanout()
            .publish(DomainEvent::WebRTCSignal(WebRtcSignalEvent {
                call_id,
                conversation_id: call.conversation_id,
                signal_type: request.signal_type,
                payload: request.payload,
                from_user_id: by_user,
                to_user_id: request.target_user_id,
            }))
            .await;

        Ok(())
    }

    /// The conversation's current non-terminal call, if any
    #[instrument(skip(self))]
    pub async fn active_call(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Option<CallResponse>> {
        VisibilityService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;

        let call = self.ctx.call_repo().find_active(conversation_id).await?;
        Ok(call.map(CallResponse::from))
    }

    /// Ended calls of a conversation, newest first
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        page: i64,
    ) -> ServiceResult<Vec<CallResponse>> {
        VisibilityService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;

        let page = page.max(1);
        let calls = self
            .ctx
            .call_repo()
            .history(
                conversation_id,
                HISTORY_PAGE_SIZE,
                (page - 1) * HISTORY_PAGE_SIZE,
            )
            .await?;

        Ok(calls.into_iter().map(CallResponse::from).collect())
    }

    async fn find_call(&self, call_id: Uuid) -> ServiceResult<Call> {
        self.ctx
            .call_repo()
            .find_by_token(call_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Call", call_id))
    }
}
