// Tests for the connection binder and message relay: last-writer-wins
// binding, counterpart resolution, and at-least-stored delivery.

use parla::{
    ConnectionBinder, ConnectionHandle, MessageDraft, MessageRelay, PushEvent, Role, SessionError,
    SessionStore,
};
use tokio::sync::mpsc;

fn draft(original: &str, translated: &str) -> MessageDraft {
    MessageDraft {
        original_text: original.to_string(),
        translated_text: translated.to_string(),
        audio_url: format!("/api/audio/{}.mp3", translated.to_lowercase()),
        source_lang: "en".to_string(),
        target_lang: "es".to_string(),
    }
}

fn handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<PushEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ConnectionHandle::new(tx), rx)
}

struct Fixture {
    store: SessionStore,
    binder: ConnectionBinder,
    relay: MessageRelay,
}

fn fixture() -> Fixture {
    let store = SessionStore::new();
    let binder = ConnectionBinder::new(store.clone());
    let relay = MessageRelay::new(store.clone(), binder.clone());
    Fixture {
        store,
        binder,
        relay,
    }
}

async fn paired_session(store: &SessionStore) -> String {
    let (session_id, _) = store.create("Alice", "en").await.unwrap();
    store.join(&session_id, "Bob", "es").await.unwrap();
    session_id
}

#[tokio::test]
async fn publish_to_unknown_session_is_not_found() {
    let f = fixture();

    let err = f
        .relay
        .publish("ZZZZZZ", Role::RoleA, draft("Hello", "Hola"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::NotFound(_)));
}

#[tokio::test]
async fn publish_without_counterpart_connection_is_still_stored() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    let message = f
        .relay
        .publish(&session_id, Role::RoleA, draft("Hello", "Hola"))
        .await
        .unwrap();

    assert_eq!(message.original_text, "Hello");
    assert_eq!(message.translated_text, "Hola");
    assert_eq!(message.sender_role, Role::RoleA);

    let history = f.relay.history(&session_id, 0).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], message);
}

#[tokio::test]
async fn publish_pushes_to_the_counterpart_connection() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    let (alice, mut alice_rx) = handle();
    assert!(f.binder.bind(&session_id, Role::RoleA, alice).await);

    let published = f
        .relay
        .publish(&session_id, Role::RoleB, draft("Hola", "Hello"))
        .await
        .unwrap();

    match alice_rx.recv().await.unwrap() {
        PushEvent::NewMessage(message) => assert_eq!(message, published),
        other => panic!("expected NewMessage, got {:?}", other),
    }
}

#[tokio::test]
async fn sender_connection_never_receives_its_own_message() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    let (alice, mut alice_rx) = handle();
    assert!(f.binder.bind(&session_id, Role::RoleA, alice).await);

    f.relay
        .publish(&session_id, Role::RoleA, draft("Hello", "Hola"))
        .await
        .unwrap();

    assert!(alice_rx.try_recv().is_err());
}

#[tokio::test]
async fn publish_survives_a_dropped_counterpart_receiver() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    let (alice, alice_rx) = handle();
    assert!(f.binder.bind(&session_id, Role::RoleA, alice).await);
    drop(alice_rx);

    let message = f
        .relay
        .publish(&session_id, Role::RoleB, draft("Hola", "Hello"))
        .await
        .unwrap();

    // The push was dropped by the dead connection, but the transcript
    // still has the message.
    let history = f.relay.history(&session_id, 0).await.unwrap();
    assert_eq!(history, vec![message]);
}

#[tokio::test]
async fn history_returns_the_most_recent_messages_in_order() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    for text in ["one", "two", "three", "four", "five"] {
        f.relay
            .publish(&session_id, Role::RoleA, draft(text, text))
            .await
            .unwrap();
    }

    let all = f.relay.history(&session_id, 0).await.unwrap();
    let texts: Vec<_> = all.iter().map(|m| m.original_text.as_str()).collect();
    assert_eq!(texts, ["one", "two", "three", "four", "five"]);

    let tail = f.relay.history(&session_id, 2).await.unwrap();
    let texts: Vec<_> = tail.iter().map(|m| m.original_text.as_str()).collect();
    assert_eq!(texts, ["four", "five"]);
}

#[tokio::test]
async fn history_is_append_only() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    f.relay
        .publish(&session_id, Role::RoleA, draft("first", "primero"))
        .await
        .unwrap();
    let earlier = f.relay.history(&session_id, 0).await.unwrap();

    f.relay
        .publish(&session_id, Role::RoleB, draft("second", "segundo"))
        .await
        .unwrap();
    let later = f.relay.history(&session_id, 0).await.unwrap();

    assert_eq!(later.len(), earlier.len() + 1);
    assert_eq!(&later[..earlier.len()], &earlier[..]);
}

#[tokio::test]
async fn bind_to_unknown_session_is_refused() {
    let f = fixture();

    let (conn, _rx) = handle();
    assert!(!f.binder.bind("ZZZZZZ", Role::RoleA, conn).await);
}

#[tokio::test]
async fn bind_to_an_unfilled_slot_is_refused() {
    let f = fixture();
    let (session_id, _) = f.store.create("Alice", "en").await.unwrap();

    let (conn, _rx) = handle();
    assert!(!f.binder.bind(&session_id, Role::RoleB, conn).await);
}

#[tokio::test]
async fn reconnect_replaces_the_stale_connection() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    let (stale, mut stale_rx) = handle();
    let (fresh, mut fresh_rx) = handle();
    assert!(f.binder.bind(&session_id, Role::RoleA, stale).await);
    assert!(f.binder.bind(&session_id, Role::RoleA, fresh).await);

    f.relay
        .publish(&session_id, Role::RoleB, draft("Hola", "Hello"))
        .await
        .unwrap();

    assert!(matches!(
        fresh_rx.recv().await,
        Some(PushEvent::NewMessage(_))
    ));
    assert!(stale_rx.try_recv().is_err());
}

#[tokio::test]
async fn stale_unbind_after_reconnect_is_a_no_op() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    let (stale, _stale_rx) = handle();
    let (fresh, _fresh_rx) = handle();
    let stale_id = stale.id();
    let fresh_id = fresh.id();

    assert!(f.binder.bind(&session_id, Role::RoleA, stale).await);
    assert!(f.binder.bind(&session_id, Role::RoleA, fresh).await);

    // The old connection's disconnect arrives after the reconnect.
    assert!(!f.binder.unbind(&session_id, Role::RoleA, stale_id).await);
    assert!(f
        .binder
        .resolve_counterpart(&session_id, Role::RoleB)
        .await
        .is_some());

    assert!(f.binder.unbind(&session_id, Role::RoleA, fresh_id).await);
    assert!(f
        .binder
        .resolve_counterpart(&session_id, Role::RoleB)
        .await
        .is_none());
}

#[tokio::test]
async fn resolve_counterpart_is_none_until_the_peer_connects() {
    let f = fixture();
    let session_id = paired_session(&f.store).await;

    assert!(f
        .binder
        .resolve_counterpart(&session_id, Role::RoleA)
        .await
        .is_none());

    let (bob, _rx) = handle();
    assert!(f.binder.bind(&session_id, Role::RoleB, bob).await);

    assert!(f
        .binder
        .resolve_counterpart(&session_id, Role::RoleA)
        .await
        .is_some());
}
