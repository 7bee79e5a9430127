//! Fan-out and dispatch against the in-memory store.

use std::sync::Arc;

use agency_core::channels::{Channel, EventName};
use agency_core::effects::{Effect, EntityKind, NotificationDraft, NotificationKind};
use agency_core::roles::{Role, UserStatus};
use agency_db::models::notification::NotificationQuery;
use agency_db::models::user::NewUser;
use agency_db::{EntityStore, MemoryStore};
use agency_events::{EffectDispatcher, EventBus, NotificationFanout};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_users(store: &MemoryStore, users: &[(&str, Role, UserStatus)]) -> Vec<i64> {
    let mut tx = store.begin().await.unwrap();
    let mut ids = Vec::new();
    for (email, role, status) in users {
        let user = tx
            .insert_user(&NewUser {
                email: email.to_string(),
                name: email.to_string(),
                role: *role,
                status: *status,
            })
            .await
            .unwrap();
        ids.push(user.id);
    }
    tx.commit().await.unwrap();
    ids
}

fn dispatcher(store: &MemoryStore, bus: &Arc<EventBus>) -> EffectDispatcher {
    let store: Arc<dyn EntityStore> = Arc::new(store.clone());
    EffectDispatcher::new(NotificationFanout::new(store, Arc::clone(bus)), Arc::clone(bus))
}

async fn unread(store: &MemoryStore, user_id: i64) -> i64 {
    let mut tx = store.begin().await.unwrap();
    tx.unread_count(user_id).await.unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn role_recipients_resolve_to_active_users_only() {
    let store = MemoryStore::new();
    let ids = seed_users(
        &store,
        &[
            ("a1@example.com", Role::Admin, UserStatus::Active),
            ("a2@example.com", Role::Admin, UserStatus::Suspended),
            ("a3@example.com", Role::Admin, UserStatus::Active),
            ("m@example.com", Role::Manager, UserStatus::Active),
        ],
    )
    .await;
    let bus = Arc::new(EventBus::default());

    let draft = NotificationDraft::new(NotificationKind::ProjectCompleted, "Done", "Shipped")
        .about(EntityKind::Project, 77);
    let report = dispatcher(&store, &bus)
        .dispatch(vec![Effect::notify_role(Role::Admin, draft)])
        .await;

    assert_eq!(report.notifications, 2);
    assert_eq!(unread(&store, ids[0]).await, 1);
    assert_eq!(unread(&store, ids[1]).await, 0);
    assert_eq!(unread(&store, ids[2]).await, 1);
    assert_eq!(unread(&store, ids[3]).await, 0);
}

#[tokio::test]
async fn each_notification_is_announced_on_the_user_channel() {
    let store = MemoryStore::new();
    let ids = seed_users(
        &store,
        &[("d@example.com", Role::Developer, UserStatus::Active)],
    )
    .await;
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();

    let draft = NotificationDraft::new(NotificationKind::TaskAssigned, "New task", "Header")
        .about(EntityKind::Task, 5);
    dispatcher(&store, &bus)
        .dispatch(vec![Effect::notify_user(ids[0], draft)])
        .await;

    let event = rx.recv().await.unwrap();
    assert_eq!(event.channel, Channel::User(ids[0]));
    assert_eq!(event.event, EventName::NotificationNew);
    assert_eq!(event.payload["type"], "TASK_ASSIGNED");
    assert_eq!(event.payload["reference_type"], "task");
    assert_eq!(event.payload["reference_id"], 5);

    let mut tx = store.begin().await.unwrap();
    let rows = tx
        .list_notifications(ids[0], &NotificationQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "New task");
}

#[tokio::test]
async fn publish_effects_go_straight_to_the_bus_in_order() {
    let store = MemoryStore::new();
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();

    let report = dispatcher(&store, &bus)
        .dispatch(vec![
            Effect::publish(
                Channel::Project(2),
                EventName::TaskStatusChanged,
                serde_json::json!({"task_id": 1}),
            ),
            Effect::publish(
                Channel::Project(2),
                EventName::ProjectUpdated,
                serde_json::json!({"status": "REVIEW"}),
            ),
        ])
        .await;

    assert_eq!(report.published, 2);
    assert_eq!(rx.recv().await.unwrap().event, EventName::TaskStatusChanged);
    assert_eq!(rx.recv().await.unwrap().event, EventName::ProjectUpdated);
}

#[tokio::test]
async fn empty_recipient_list_is_a_no_op() {
    let store = MemoryStore::new();
    let bus = Arc::new(EventBus::default());
    let draft = NotificationDraft::new(NotificationKind::Reminder, "t", "m");
    let report = dispatcher(&store, &bus)
        .dispatch(vec![Effect::notify_users(Vec::new(), draft)])
        .await;
    assert_eq!(report.notifications, 0);
    assert_eq!(report.failed_notifications, 0);
}

#[tokio::test]
async fn one_failed_recipient_does_not_stop_the_rest() {
    let store = MemoryStore::new();
    let bus = Arc::new(EventBus::default());
    let ids = seed_users(&store, &[("a@x.test", Role::Developer, UserStatus::Active)]).await;
    let draft = NotificationDraft::new(NotificationKind::Reminder, "t", "m");

    let report = dispatcher(&store, &bus)
        .dispatch(vec![Effect::notify_users([9_999, ids[0]], draft)])
        .await;

    assert_eq!(report.notifications, 1);
    assert_eq!(report.failed_notifications, 1);
    assert_eq!(unread(&store, ids[0]).await, 1);
}
