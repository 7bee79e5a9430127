//! Post-commit side effects.
//!
//! Transition planners return a list of [`Effect`]s alongside the new
//! entity state instead of sending anything themselves. A dispatcher runs
//! the list after the store transaction commits; failures there never undo
//! the transition.

use serde::Serialize;

use crate::channels::{Channel, EventName};
use crate::roles::Role;
use crate::types::DbId;

string_enum! {
    /// Entity kinds used for polymorphic notification back-references.
    pub enum EntityKind {
        Project => "project",
        Task => "task",
        DesignAsset => "design_asset",
        Revision => "revision",
        Requirement => "requirement",
        ProjectReview => "project_review",
    }
}

string_enum! {
    pub enum NotificationKind {
        ProjectAssigned => "PROJECT_ASSIGNED",
        ProjectUpdated => "PROJECT_UPDATED",
        ProjectReadyForReview => "PROJECT_READY_FOR_REVIEW",
        ProjectCompleted => "PROJECT_COMPLETED",
        RequirementApproved => "REQUIREMENT_APPROVED",
        TaskAssigned => "TASK_ASSIGNED",
        TaskSubmitted => "TASK_SUBMITTED",
        TaskApproved => "TASK_APPROVED",
        TaskRejected => "TASK_REJECTED",
        AssetRequested => "ASSET_REQUESTED",
        AssetSubmitted => "ASSET_SUBMITTED",
        AssetApproved => "ASSET_APPROVED",
        AssetRejected => "ASSET_REJECTED",
        RevisionCreated => "REVISION_CREATED",
        RevisionAssigned => "REVISION_ASSIGNED",
        RevisionSubmitted => "REVISION_SUBMITTED",
        RevisionCompleted => "REVISION_COMPLETED",
        ReviewReceived => "REVIEW_RECEIVED",
        Reminder => "REMINDER",
    }
}

/// Back-reference from a notification to the entity it is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub entity: EntityKind,
    pub id: DbId,
}

impl Reference {
    pub fn new(entity: EntityKind, id: DbId) -> Self {
        Self { entity, id }
    }
}

/// Notification content, independent of recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference: Option<Reference>,
}

impl NotificationDraft {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            reference: None,
        }
    }

    pub fn about(mut self, entity: EntityKind, id: DbId) -> Self {
        self.reference = Some(Reference::new(entity, id));
        self
    }
}

/// Who receives a notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Recipients {
    Users(Vec<DbId>),
    /// Every ACTIVE user holding the role, resolved at dispatch time.
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    Notify {
        recipients: Recipients,
        draft: NotificationDraft,
    },
    Publish {
        channel: Channel,
        event: EventName,
        payload: serde_json::Value,
    },
}

impl Effect {
    pub fn notify_user(user_id: DbId, draft: NotificationDraft) -> Self {
        Effect::Notify {
            recipients: Recipients::Users(vec![user_id]),
            draft,
        }
    }

    /// Notify several users, dropping duplicates while keeping first-seen order.
    pub fn notify_users(user_ids: impl IntoIterator<Item = DbId>, draft: NotificationDraft) -> Self {
        let mut ids: Vec<DbId> = Vec::new();
        for id in user_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Effect::Notify {
            recipients: Recipients::Users(ids),
            draft,
        }
    }

    pub fn notify_role(role: Role, draft: NotificationDraft) -> Self {
        Effect::Notify {
            recipients: Recipients::Role(role),
            draft,
        }
    }

    pub fn publish(channel: Channel, event: EventName, payload: impl Serialize) -> Self {
        Effect::Publish {
            channel,
            event,
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_users_deduplicates_in_order() {
        let draft = NotificationDraft::new(NotificationKind::AssetApproved, "t", "m");
        let effect = Effect::notify_users([3, 1, 3, 2, 1], draft);
        match effect {
            Effect::Notify {
                recipients: Recipients::Users(ids),
                ..
            } => assert_eq!(ids, vec![3, 1, 2]),
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn draft_reference_is_attached() {
        let draft = NotificationDraft::new(NotificationKind::TaskAssigned, "t", "m")
            .about(EntityKind::Task, 8);
        assert_eq!(draft.reference, Some(Reference::new(EntityKind::Task, 8)));
    }
}
