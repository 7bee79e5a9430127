//! Notification models.

use agency_core::effects::{NotificationKind, Reference};
use agency_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
///
/// Rows are never mutated after insert except for `is_read` / `read_at`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub notification_type: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification for one recipient.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: DbId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference: Option<Reference>,
}

impl NewNotification {
    pub fn reference_type(&self) -> Option<&'static str> {
        self.reference.map(|r| r.entity.as_str())
    }

    pub fn reference_id(&self) -> Option<DbId> {
        self.reference.map(|r| r.id)
    }
}

/// Paging for notification listings, newest first.
#[derive(Debug, Clone, Copy)]
pub struct NotificationQuery {
    pub unread_only: bool,
    pub limit: i64,
    pub offset: i64,
}

impl Default for NotificationQuery {
    fn default() -> Self {
        Self {
            unread_only: false,
            limit: 50,
            offset: 0,
        }
    }
}
