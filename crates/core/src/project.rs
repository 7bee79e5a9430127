//! Project status machine (NEW → … → COMPLETED) and its derived edges.
//!
//! Manual actions go through [`PROJECT_EDGES`]. The remaining functions
//! compute the status a project is pushed into as a side effect of a
//! Requirement, Task or Revision transition; each returns `None` when the
//! project should stay where it is.

use crate::error::CoreError;
use crate::machine::{self, Edge};
use crate::task::TaskStatus;

string_enum! {
    pub enum ProjectStatus {
        New => "NEW",
        RequirementsPending => "REQUIREMENTS_PENDING",
        InProgress => "IN_PROGRESS",
        Review => "REVIEW",
        ClientReview => "CLIENT_REVIEW",
        Completed => "COMPLETED",
        OnHold => "ON_HOLD",
        Cancelled => "CANCELLED",
    }
}

string_enum! {
    pub enum ProjectPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Urgent => "URGENT",
    }
}

string_enum! {
    pub enum ProjectComplexity {
        Simple => "SIMPLE",
        Medium => "MEDIUM",
        Complex => "COMPLEX",
    }
}

string_enum! {
    pub enum ProjectAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
        AssignTeamLead => "assignTeamLead",
        AssignDesigner => "assignDesigner",
        MarkDelivered => "markDelivered",
        SendToClient => "sendToClient",
        ClientRequestsChanges => "clientRequestsChanges",
        MarkCompleted => "markCompleted",
        Hold => "hold",
        Resume => "resume",
        Cancel => "cancel",
    }
}

use ProjectStatus::*;

/// Statuses in which work is still being produced.
const WORKING: &[ProjectStatus] = &[New, RequirementsPending, InProgress];

/// Manually fired project transitions.
pub const PROJECT_EDGES: &[Edge<ProjectStatus, ProjectAction>] = &[
    Edge {
        action: ProjectAction::MarkDelivered,
        from: &[InProgress],
        to: Review,
        rejection: "Only in-progress projects can be marked delivered",
    },
    Edge {
        action: ProjectAction::SendToClient,
        from: &[Review],
        to: ClientReview,
        rejection: "Only projects in review can be sent to the client",
    },
    Edge {
        action: ProjectAction::ClientRequestsChanges,
        from: &[ClientReview],
        to: InProgress,
        rejection: "Changes can only be requested while the client is reviewing",
    },
    Edge {
        action: ProjectAction::MarkCompleted,
        from: &[Review, ClientReview],
        to: Completed,
        rejection: "Only projects in review or client review can be completed",
    },
    Edge {
        action: ProjectAction::Hold,
        from: &[New, RequirementsPending, InProgress, Review, ClientReview],
        to: OnHold,
        rejection: "Only active projects can be put on hold",
    },
    Edge {
        action: ProjectAction::Resume,
        from: &[OnHold],
        to: InProgress,
        rejection: "Only projects on hold can be resumed",
    },
    Edge {
        action: ProjectAction::Cancel,
        from: &[New, RequirementsPending, InProgress, Review, ClientReview, OnHold],
        to: Cancelled,
        rejection: "Completed or cancelled projects cannot be cancelled",
    },
];

impl ProjectStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Completed | Cancelled)
    }
}

/// Fire a manual project transition.
pub fn next_status(current: ProjectStatus, action: ProjectAction) -> Result<ProjectStatus, CoreError> {
    machine::fire(PROJECT_EDGES, current, action)
}

/// Project fields may only be edited before a terminal status is reached.
pub fn ensure_editable(current: ProjectStatus) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::invalid_state(
            "Completed or cancelled projects cannot be modified",
        ));
    }
    Ok(())
}

fn all_approved(tasks: &[TaskStatus]) -> bool {
    tasks.iter().all(|s| *s == TaskStatus::Approved)
}

/// `markDelivered`: every task approved, at least one task, then IN_PROGRESS → REVIEW.
pub fn mark_delivered(current: ProjectStatus, tasks: &[TaskStatus]) -> Result<ProjectStatus, CoreError> {
    let next = next_status(current, ProjectAction::MarkDelivered)?;
    if tasks.is_empty() {
        return Err(CoreError::invalid_state("Project has no tasks to deliver"));
    }
    if !all_approved(tasks) {
        return Err(CoreError::invalid_state(
            "All tasks must be approved before the project can be delivered",
        ));
    }
    Ok(next)
}

/// The first requirement moves a NEW project to REQUIREMENTS_PENDING.
pub fn after_requirement_created(current: ProjectStatus, is_first: bool) -> Option<ProjectStatus> {
    (is_first && current == New).then_some(RequirementsPending)
}

/// Approving a requirement while pending starts the build.
pub fn after_requirement_approved(current: ProjectStatus) -> Option<ProjectStatus> {
    (current == RequirementsPending).then_some(InProgress)
}

/// Assigning a team lead starts the build; requirements are not a prerequisite.
pub fn after_team_lead_assigned(current: ProjectStatus) -> Option<ProjectStatus> {
    matches!(current, New | RequirementsPending).then_some(InProgress)
}

/// Task approval promotes a working project to REVIEW once every sibling
/// (including the task just approved) is APPROVED.
pub fn after_task_approved(current: ProjectStatus, siblings: &[TaskStatus]) -> Option<ProjectStatus> {
    if siblings.is_empty() || !WORKING.contains(&current) {
        return None;
    }
    all_approved(siblings).then_some(Review)
}

/// Creating a revision forces the project into CLIENT_REVIEW, reopening
/// COMPLETED projects. Cancelled projects cannot be revised.
pub fn on_revision_created(current: ProjectStatus) -> Result<ProjectStatus, CoreError> {
    if current == Cancelled {
        return Err(CoreError::invalid_state(
            "Revisions cannot be created on a cancelled project",
        ));
    }
    Ok(ClientReview)
}

/// Once no revision is outstanding the project either completes (all
/// tasks approved) or returns to IN_PROGRESS. Held and cancelled projects
/// keep their status.
pub fn after_revision_accepted(
    current: ProjectStatus,
    outstanding: usize,
    tasks: &[TaskStatus],
) -> Option<ProjectStatus> {
    if outstanding > 0 || matches!(current, OnHold | Cancelled) {
        return None;
    }
    let next = if all_approved(tasks) { Completed } else { InProgress };
    (next != current).then_some(next)
}
