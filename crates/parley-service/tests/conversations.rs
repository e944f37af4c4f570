//! Conversation service and visibility engine behavior

mod support;

use parley_service::{ConversationService, MessageService, SendMessageRequest, VisibilityService};

fn send_request(conversation_id: uuid::Uuid, body: &str) -> SendMessageRequest {
    SendMessageRequest {
        conversation_id,
        body: Some(body.to_string()),
        attachments: vec![],
    }
}

#[tokio::test]
async fn direct_conversation_is_deduplicated() {
    let (ctx, _, transport) = support::context();
    let service = ConversationService::new(&ctx);

    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;

    let first = service.find_or_create_direct(a, b).await.unwrap();
    let second = service.find_or_create_direct(a, b).await.unwrap();
    // Order of the pair must not matter
    let third = service.find_or_create_direct(b, a).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.id, third.id);
    // One creation, announced once per participant's personal channel
    assert_eq!(
        transport.channels_of("ConversationCreated").len(),
        2,
        "only the first call may announce a creation"
    );
}

#[tokio::test]
async fn concurrent_direct_creation_yields_one_conversation() {
    let (ctx, _, transport) = support::context();
    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;
    let service = ConversationService::new(&ctx);

    let (left, right) = tokio::join!(
        service.find_or_create_direct(a, b),
        service.find_or_create_direct(b, a),
    );

    assert_eq!(left.unwrap().id, right.unwrap().id);
    // Exactly one creation happened: two channel publishes, not four
    assert_eq!(transport.channels_of("ConversationCreated").len(), 2);
}

#[tokio::test]
async fn group_creation_never_deduplicates() {
    let (ctx, _, _) = support::context();
    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;
    let c = support_seed(&ctx).await;
    let service = ConversationService::new(&ctx);

    let first = service
        .create_group(a, &[b, c], Some("team".to_string()))
        .await
        .unwrap();
    let second = service
        .create_group(a, &[b, c], Some("team".to_string()))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn reopening_a_hidden_direct_conversation_restores_it_for_all() {
    let (ctx, backend, transport) = support::context();
    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;
    let conversations = ConversationService::new(&ctx);
    let visibility = VisibilityService::new(&ctx);

    let conversation = conversations.find_or_create_direct(a, b).await.unwrap();
    visibility.mark_deleted(conversation.id, a).await.unwrap();
    assert!(backend.has_marker(conversation.id, a));
    transport.clear();

    let reopened = conversations.find_or_create_direct(a, b).await.unwrap();

    assert_eq!(reopened.id, conversation.id);
    assert!(!backend.has_marker(conversation.id, a));
    // The restoration resurfaces the thread on both sides
    let channels = transport.channels_of("ConversationRestored");
    assert!(channels.contains(&format!("user.{a}")));
    assert!(channels.contains(&format!("user.{b}")));
    // A clean reopen afterwards is silent
    transport.clear();
    conversations.find_or_create_direct(a, b).await.unwrap();
    assert!(transport.published().is_empty());
}

#[tokio::test]
async fn soft_delete_hides_for_one_user_only() {
    let (ctx, _, transport) = support::context();
    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;
    let conversations = ConversationService::new(&ctx);
    let visibility = VisibilityService::new(&ctx);
    let messages = MessageService::new(&ctx);

    let conversation = conversations.find_or_create_direct(a, b).await.unwrap();
    messages
        .send(b, send_request(conversation.id, "hello"))
        .await
        .unwrap();

    visibility.mark_deleted(conversation.id, a).await.unwrap();

    assert!(!visibility.is_visible(conversation.id, a).await.unwrap());
    assert!(visibility.is_visible(conversation.id, b).await.unwrap());
    assert!(visibility.list_visible(a).await.unwrap().is_empty());
    assert_eq!(visibility.list_visible(b).await.unwrap().len(), 1);
    assert_eq!(visibility.list_deleted(a).await.unwrap().len(), 1);

    // Deletion is announced to the deleting user only
    assert_eq!(
        transport.channels_of("ConversationDeleted"),
        vec![format!("user.{a}")]
    );

    // Deleting again is a no-op
    visibility.mark_deleted(conversation.id, a).await.unwrap();
    assert_eq!(visibility.list_deleted(a).await.unwrap().len(), 1);
}

#[tokio::test]
async fn new_message_revives_hidden_conversation_with_unread() {
    let (ctx, backend, transport) = support::context();
    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;
    let conversations = ConversationService::new(&ctx);
    let visibility = VisibilityService::new(&ctx);
    let messages = MessageService::new(&ctx);

    let conversation = conversations.find_or_create_direct(a, b).await.unwrap();
    visibility.mark_deleted(conversation.id, a).await.unwrap();
    transport.clear();

    messages
        .send(b, send_request(conversation.id, "are you there?"))
        .await
        .unwrap();

    assert!(!backend.has_marker(conversation.id, a));
    let list = visibility.list_visible(a).await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(list[0].unread_count >= 1);
    assert!(!transport.named("ConversationRestored").is_empty());
}

#[tokio::test]
async fn one_restoration_broadcast_even_with_multiple_hidden_participants() {
    let (ctx, backend, transport) = support::context();
    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;
    let c = support_seed(&ctx).await;
    let conversations = ConversationService::new(&ctx);
    let visibility = VisibilityService::new(&ctx);

    let conversation = conversations
        .create_group(a, &[b, c], Some("trio".to_string()))
        .await
        .unwrap();
    visibility.mark_deleted(conversation.id, b).await.unwrap();
    visibility.mark_deleted(conversation.id, c).await.unwrap();
    transport.clear();

    MessageService::new(&ctx)
        .send(a, send_request(conversation.id, "wake up"))
        .await
        .unwrap();

    assert!(!backend.has_marker(conversation.id, b));
    assert!(!backend.has_marker(conversation.id, c));
    // Two markers cleared, but a single restoration event: one publish per
    // participant channel, not one per restored marker
    assert_eq!(transport.channels_of("ConversationRestored").len(), 3);
}

#[tokio::test]
async fn non_participant_operations_fail() {
    let (ctx, _, _) = support::context();
    let a = support_seed(&ctx).await;
    let b = support_seed(&ctx).await;
    let outsider = support_seed(&ctx).await;
    let conversations = ConversationService::new(&ctx);
    let visibility = VisibilityService::new(&ctx);

    let conversation = conversations.find_or_create_direct(a, b).await.unwrap();

    let err = visibility
        .mark_deleted(conversation.id, outsider)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_A_PARTICIPANT");

    let err = visibility
        .restore(conversation.id, outsider)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_A_PARTICIPANT");
}

async fn support_seed(ctx: &parley_service::ServiceContext) -> uuid::Uuid {
    let user = parley_core::User::new(format!("user-{}", uuid::Uuid::new_v4()));
    ctx.user_repo().create(&user).await.unwrap();
    user.id
}
