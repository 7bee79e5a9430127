//! Connection registry, presence and channel routing.

use agency_api::ws::WsManager;
use agency_core::channels::Channel;
use assert_matches::assert_matches;
use axum::extract::ws::Message;

fn text(message: Message) -> String {
    match message {
        Message::Text(t) => t.as_str().to_string(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn presence_follows_the_last_connection() {
    let manager = WsManager::new();
    let _a = manager.add("conn-a".into(), 7).await;
    let _b = manager.add("conn-b".into(), 7).await;

    assert!(manager.is_online(7).await);
    assert_eq!(manager.get_by_user(7).await.len(), 2);

    manager.remove("conn-a").await;
    assert!(manager.is_online(7).await);

    manager.remove("conn-b").await;
    assert!(!manager.is_online(7).await);
    assert!(manager.get_by_user(7).await.is_empty());
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn user_channel_reaches_every_connection_of_that_user() {
    let manager = WsManager::new();
    let mut a = manager.add("conn-a".into(), 7).await;
    let mut b = manager.add("conn-b".into(), 7).await;
    let mut other = manager.add("conn-c".into(), 8).await;

    let sent = manager
        .send_to_channel(Channel::User(7), Message::Text("hello".into()))
        .await;

    assert_eq!(sent, 2);
    assert_eq!(text(a.recv().await.unwrap()), "hello");
    assert_eq!(text(b.recv().await.unwrap()), "hello");
    assert!(other.try_recv().is_err());
}

#[tokio::test]
async fn project_channel_reaches_subscribers_only() {
    let manager = WsManager::new();
    let mut joined = manager.add("conn-a".into(), 7).await;
    let mut idle = manager.add("conn-b".into(), 8).await;

    assert!(manager.subscribe("conn-a", 12).await);
    assert!(!manager.subscribe("missing", 12).await);

    let sent = manager
        .send_to_channel(Channel::Project(12), Message::Text("update".into()))
        .await;
    assert_eq!(sent, 1);
    assert_eq!(text(joined.recv().await.unwrap()), "update");
    assert!(idle.try_recv().is_err());

    assert!(manager.unsubscribe("conn-a", 12).await);
    assert!(!manager.unsubscribe("conn-a", 12).await);
    let sent = manager
        .send_to_channel(Channel::Project(12), Message::Text("again".into()))
        .await;
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn send_to_connection_reports_missing_connections() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-a".into(), 7).await;

    assert!(manager.send_to_connection("conn-a", Message::Text("hi".into())).await);
    assert!(!manager.send_to_connection("conn-z", Message::Text("hi".into())).await);
    assert_eq!(text(rx.recv().await.unwrap()), "hi");
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears_presence() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-a".into(), 7).await;

    manager.shutdown_all().await;

    assert_matches!(rx.recv().await, Some(Message::Close(None)));
    assert_eq!(manager.connection_count().await, 0);
    assert!(!manager.is_online(7).await);
}

#[tokio::test]
async fn ping_all_reaches_every_connection() {
    let manager = WsManager::new();
    let mut a = manager.add("conn-a".into(), 7).await;
    let mut b = manager.add("conn-b".into(), 8).await;

    manager.ping_all().await;

    assert_matches!(a.recv().await, Some(Message::Ping(_)));
    assert_matches!(b.recv().await, Some(Message::Ping(_)));
}
