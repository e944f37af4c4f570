//! Call signaling state machine behavior

mod support;

use chrono::Duration;
use parley_core::{CallStatus, User};
use parley_service::{CallService, ConversationService, ServiceContext, SignalRequest};
use serde_json::json;
use uuid::Uuid;

const VALID_SDP: &str = "v=0\r\no=- 46117317 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=setup:active\r\n";

async fn seed(ctx: &ServiceContext) -> Uuid {
    let user = User::new(format!("user-{}", Uuid::new_v4()));
    ctx.user_repo().create(&user).await.unwrap();
    user.id
}

async fn direct(ctx: &ServiceContext, a: Uuid, b: Uuid) -> Uuid {
    ConversationService::new(ctx)
        .find_or_create_direct(a, b)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn call_lifecycle_ringing_active_ended() {
    let (ctx, _, transport) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();
    assert_eq!(call.status, CallStatus::Ringing);
    assert!(call.started_at.is_none());

    // Ringing is announced to the receiver only
    assert_eq!(
        transport.channels_of("CallInitiated"),
        vec![format!("user.{receiver}")]
    );

    let active = service.accept(call.call_id, receiver).await.unwrap();
    assert_eq!(active.status, CallStatus::Active);
    assert!(active.started_at.is_some());
    assert_eq!(
        transport.channels_of("CallAccepted"),
        vec![format!("user.{caller}")]
    );

    let ended = service.end(call.call_id, caller).await.unwrap();
    assert_eq!(ended.status, CallStatus::Ended);
    assert!(ended.ended_at.is_some());
    let duration = ended.duration_secs.unwrap();
    assert_eq!(
        duration,
        (ended.ended_at.unwrap() - active.started_at.unwrap()).num_seconds()
    );
    // Hang-up by the caller notifies the receiver
    assert_eq!(
        transport.channels_of("CallEnded"),
        vec![format!("user.{receiver}")]
    );
}

#[tokio::test]
async fn second_accept_fails_with_invalid_state() {
    let (ctx, _, _) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();

    service.accept(call.call_id, receiver).await.unwrap();
    let err = service.accept(call.call_id, receiver).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATE");
}

#[tokio::test]
async fn only_the_receiver_may_accept_or_reject() {
    let (ctx, _, transport) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();

    let err = service.accept(call.call_id, caller).await.unwrap_err();
    assert_eq!(err.error_code(), "FORBIDDEN");
    let err = service.reject(call.call_id, caller).await.unwrap_err();
    assert_eq!(err.error_code(), "FORBIDDEN");

    let rejected = service.reject(call.call_id, receiver).await.unwrap();
    assert_eq!(rejected.status, CallStatus::Rejected);
    assert_eq!(
        transport.channels_of("CallRejected"),
        vec![format!("user.{caller}")]
    );
}

#[tokio::test]
async fn ending_requires_a_call_party() {
    let (ctx, _, _) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let outsider = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();

    let err = service.end(call.call_id, outsider).await.unwrap_err();
    assert_eq!(err.error_code(), "FORBIDDEN");

    // Ending a never-answered call has no duration
    let ended = service.end(call.call_id, receiver).await.unwrap();
    assert!(ended.duration_secs.is_none());
}

#[tokio::test]
async fn initiate_requires_both_parties_in_conversation() {
    let (ctx, _, _) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let outsider = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let err = service
        .initiate(caller, conversation_id, outsider)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TARGET");

    let err = service
        .initiate(outsider, conversation_id, receiver)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TARGET");

    let err = service
        .initiate(caller, conversation_id, caller)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TARGET");
}

#[tokio::test]
async fn fresh_call_blocks_but_stale_call_is_purged() {
    let (ctx, backend, _) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();

    // 30 seconds old: still live, blocks a new initiate
    backend.backdate_call(call.call_id, Duration::seconds(30));
    let err = service
        .initiate(receiver, conversation_id, caller)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CALL_IN_PROGRESS");

    // 3 minutes old: abandoned, purged, new call goes through
    backend.backdate_call(call.call_id, Duration::seconds(150));
    let replacement = service
        .initiate(receiver, conversation_id, caller)
        .await
        .unwrap();
    assert_eq!(replacement.status, CallStatus::Ringing);

    // The abandoned ringing call is recorded as missed
    assert_eq!(
        backend.call(call.call_id).unwrap().status,
        CallStatus::Missed
    );
}

#[tokio::test]
async fn signal_relays_to_target_only() {
    let (ctx, _, transport) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let outsider = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();
    transport.clear();

    service
        .signal(
            call.call_id,
            caller,
            SignalRequest {
                signal_type: parley_core::SignalKind::Offer,
                payload: json!({"sdp": VALID_SDP, "type": "offer"}),
                target_user_id: receiver,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        transport.channels_of("WebRTCSignal"),
        vec![format!("user.{receiver}")]
    );

    // Targeting anyone but the counterpart is rejected
    let err = service
        .signal(
            call.call_id,
            caller,
            SignalRequest {
                signal_type: parley_core::SignalKind::Candidate,
                payload: json!({"candidate": "..."}),
                target_user_id: outsider,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TARGET");

    let err = service
        .signal(
            call.call_id,
            caller,
            SignalRequest {
                signal_type: parley_core::SignalKind::Candidate,
                payload: json!({"candidate": "..."}),
                target_user_id: caller,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TARGET");

    // Outsiders may not signal at all
    let err = service
        .signal(
            call.call_id,
            outsider,
            SignalRequest {
                signal_type: parley_core::SignalKind::Candidate,
                payload: json!({"candidate": "..."}),
                target_user_id: caller,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "FORBIDDEN");
}

#[tokio::test]
async fn malformed_offer_is_rejected_candidates_pass_through() {
    let (ctx, _, _) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();

    let err = service
        .signal(
            call.call_id,
            caller,
            SignalRequest {
                signal_type: parley_core::SignalKind::Offer,
                payload: json!({"sdp": "not a session description", "type": "offer"}),
                target_user_id: receiver,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MALFORMED_PAYLOAD");

    // Candidate payloads are opaque, never validated
    service
        .signal(
            call.call_id,
            caller,
            SignalRequest {
                signal_type: parley_core::SignalKind::Candidate,
                payload: json!({"candidate": "candidate:0 1 UDP 2122252543 10.0.0.1 50000 typ host"}),
                target_user_id: receiver,
            },
        )
        .await
        .unwrap();

    // An ambiguous answer role is tolerated
    let ambiguous = VALID_SDP.replace("a=setup:active", "a=setup:actpass");
    service
        .signal(
            call.call_id,
            receiver,
            SignalRequest {
                signal_type: parley_core::SignalKind::Answer,
                payload: json!({"sdp": ambiguous, "type": "answer"}),
                target_user_id: caller,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn active_call_lookup_and_history() {
    let (ctx, _, _) = support::context();
    let caller = seed(&ctx).await;
    let receiver = seed(&ctx).await;
    let outsider = seed(&ctx).await;
    let conversation_id = direct(&ctx, caller, receiver).await;
    let service = CallService::new(&ctx);

    assert!(service
        .active_call(conversation_id, caller)
        .await
        .unwrap()
        .is_none());

    let call = service
        .initiate(caller, conversation_id, receiver)
        .await
        .unwrap();

    let active = service
        .active_call(conversation_id, caller)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.call_id, call.call_id);

    let err = service
        .active_call(conversation_id, outsider)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_A_PARTICIPANT");

    service.accept(call.call_id, receiver).await.unwrap();
    service.end(call.call_id, caller).await.unwrap();

    assert!(service
        .active_call(conversation_id, caller)
        .await
        .unwrap()
        .is_none());

    let history = service.history(conversation_id, caller, 1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, CallStatus::Ended);
}
