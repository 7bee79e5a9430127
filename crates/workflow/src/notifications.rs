//! Query side of notifications. Recipients only ever see and touch their
//! own rows.

use agency_core::roles::Actor;
use agency_core::types::DbId;
use agency_db::models::notification::{Notification, NotificationQuery};

use crate::error::WorkflowResult;
use crate::Workflow;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

impl Workflow {
    /// Newest first, paged.
    pub async fn list_notifications(
        &self,
        actor: &Actor,
        query: NotificationQuery,
    ) -> WorkflowResult<Vec<Notification>> {
        let query = NotificationQuery {
            limit: query.limit.clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.max(0),
            ..query
        };
        let mut tx = self.begin().await?;
        Ok(tx.list_notifications(actor.user_id, &query).await?)
    }

    pub async fn unread_notification_count(&self, actor: &Actor) -> WorkflowResult<i64> {
        let mut tx = self.begin().await?;
        Ok(tx.unread_count(actor.user_id).await?)
    }

    /// Returns `false` when the notification is not the caller's or was
    /// already read.
    pub async fn mark_notification_read(&self, actor: &Actor, id: DbId) -> WorkflowResult<bool> {
        let mut tx = self.begin().await?;
        let marked = tx.mark_notification_read(id, actor.user_id).await?;
        tx.commit().await?;
        Ok(marked)
    }

    pub async fn mark_all_notifications_read(&self, actor: &Actor) -> WorkflowResult<u64> {
        let mut tx = self.begin().await?;
        let count = tx.mark_all_notifications_read(actor.user_id).await?;
        tx.commit().await?;

        tracing::debug!(user_id = actor.user_id, count, "Notifications marked read");
        Ok(count)
    }
}
