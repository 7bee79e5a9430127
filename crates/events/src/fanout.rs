//! Notification fan-out.
//!
//! Each recipient gets an independent write: a failure for one recipient
//! is logged and does not affect the others, nor the transition that
//! triggered the notification.

use std::sync::Arc;

use agency_core::channels::{Channel, EventName};
use agency_core::effects::{NotificationDraft, Recipients};
use agency_core::types::DbId;
use agency_db::models::notification::{NewNotification, Notification};
use agency_db::models::user::UserFilter;
use agency_db::{EntityStore, StoreResult};

use crate::bus::{EventBus, RealtimeEvent};

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: Vec<DbId>,
    pub failed: Vec<DbId>,
}

/// Creates persisted notifications and announces them on `user:{id}`.
pub struct NotificationFanout {
    store: Arc<dyn EntityStore>,
    bus: Arc<EventBus>,
}

impl NotificationFanout {
    pub fn new(store: Arc<dyn EntityStore>, bus: Arc<EventBus>) -> Self {
        Self { store, bus }
    }

    /// Resolve the recipient set to user ids.
    ///
    /// Role recipients are every ACTIVE user with the role at call time.
    pub async fn resolve(&self, recipients: &Recipients) -> StoreResult<Vec<DbId>> {
        match recipients {
            Recipients::Users(ids) => Ok(ids.clone()),
            Recipients::Role(role) => {
                let mut tx = self.store.begin().await?;
                let users = tx.list_users(&UserFilter::active(*role)).await?;
                Ok(users.into_iter().map(|u| u.id).collect())
            }
        }
    }

    /// Notify every recipient, one independent write each.
    pub async fn send(&self, recipients: &Recipients, draft: &NotificationDraft) -> FanoutReport {
        let user_ids = match self.resolve(recipients).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kind = %draft.kind,
                    "Failed to resolve notification recipients"
                );
                return FanoutReport::default();
            }
        };

        let mut report = FanoutReport::default();
        for user_id in user_ids {
            match self.notify_one(user_id, draft).await {
                Ok(notification) => {
                    self.announce(&notification);
                    report.delivered.push(user_id);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        user_id,
                        kind = %draft.kind,
                        "Failed to create notification"
                    );
                    report.failed.push(user_id);
                }
            }
        }
        report
    }

    async fn notify_one(
        &self,
        user_id: DbId,
        draft: &NotificationDraft,
    ) -> StoreResult<Notification> {
        let mut tx = self.store.begin().await?;
        let notification = tx
            .insert_notification(&NewNotification {
                user_id,
                kind: draft.kind,
                title: draft.title.clone(),
                message: draft.message.clone(),
                reference: draft.reference,
            })
            .await?;
        tx.commit().await?;
        Ok(notification)
    }

    fn announce(&self, notification: &Notification) {
        let payload = match serde_json::to_value(notification) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize notification");
                return;
            }
        };
        self.bus.publish(
            RealtimeEvent::new(Channel::User(notification.user_id), EventName::NotificationNew)
                .with_payload(payload),
        );
    }
}
