//! Aggregate queries and mutations behind the API-key automation surface.
//!
//! The caller acts as a configured admin, so every operation here is
//! admin-gated and the mutating ones re-enter the regular transitions.

use std::collections::HashSet;

use agency_core::effects::{Effect, NotificationDraft, NotificationKind, Recipients, Reference};
use agency_core::error::CoreError;
use agency_core::policy;
use agency_core::project::{ProjectAction, ProjectStatus};
use agency_core::revision::RevisionStatus;
use agency_core::roles::Actor;
use agency_core::task::TaskStatus;
use agency_core::types::{DbId, Timestamp};
use agency_db::models::project::{Project, ProjectFilter};
use agency_db::models::review::ReviewFilter;
use agency_db::models::revision::RevisionFilter;
use agency_db::models::task::{Task, TaskFilter};
use agency_events::DispatchReport;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::WorkflowResult;
use crate::load;
use crate::Workflow;

/// Days covered by the weekly summary.
pub const SUMMARY_WINDOW_DAYS: i64 = 7;

/// A developer on a completed project who has not been reviewed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingReview {
    pub project_id: DbId,
    pub project_name: String,
    pub manager_id: DbId,
    pub developer_id: DbId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklySummary {
    pub since: Option<Timestamp>,
    pub projects_created: usize,
    pub projects_completed: usize,
    pub tasks_created: usize,
    pub tasks_approved: usize,
    pub revisions_created: usize,
    pub revisions_completed: usize,
    pub active_projects: usize,
    pub overdue_tasks: usize,
}

/// Payload of `send-reminder`.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub recipients: Recipients,
    pub title: String,
    pub message: String,
    pub reference: Option<Reference>,
}

fn is_overdue(task: &Task, now: Timestamp) -> bool {
    task.status != TaskStatus::Approved && task.due_date.is_some_and(|d| d < now)
}

fn since(at: Option<Timestamp>, cutoff: Timestamp) -> bool {
    at.is_some_and(|t| t >= cutoff)
}

impl Workflow {
    /// Non-terminal projects not touched within the idle window.
    pub async fn idle_projects(&self, actor: &Actor) -> WorkflowResult<Vec<Project>> {
        policy::require_admin(actor, "query idle projects")?;
        let cutoff = Utc::now() - Duration::days(self.settings().idle_project_days);

        let mut tx = self.begin().await?;
        let projects = tx
            .list_projects(&ProjectFilter {
                updated_before: Some(cutoff),
                ..ProjectFilter::default()
            })
            .await?;
        Ok(projects
            .into_iter()
            .filter(|p| !p.status.is_terminal())
            .collect())
    }

    /// Tasks past their due date that are not approved yet.
    pub async fn overdue_tasks(&self, actor: &Actor) -> WorkflowResult<Vec<Task>> {
        policy::require_admin(actor, "query overdue tasks")?;
        let now = Utc::now();

        let mut tx = self.begin().await?;
        let tasks = tx
            .list_tasks(&TaskFilter {
                due_before: Some(now),
                ..TaskFilter::default()
            })
            .await?;
        Ok(tasks.into_iter().filter(|t| is_overdue(t, now)).collect())
    }

    /// Developers with a task on a completed project and no review for it.
    pub async fn pending_reviews(&self, actor: &Actor) -> WorkflowResult<Vec<PendingReview>> {
        policy::require_admin(actor, "query pending reviews")?;

        let mut tx = self.begin().await?;
        let projects = tx
            .list_projects(&ProjectFilter {
                status: Some(ProjectStatus::Completed),
                ..ProjectFilter::default()
            })
            .await?;

        let mut pending = Vec::new();
        for project in projects {
            let reviewed: HashSet<DbId> = tx
                .list_reviews(&ReviewFilter {
                    project_id: Some(project.id),
                    ..ReviewFilter::default()
                })
                .await?
                .iter()
                .map(|r| r.developer_id)
                .collect();

            let mut seen = HashSet::new();
            for task in tx.list_tasks(&TaskFilter::for_project(project.id)).await? {
                let developer_id = task.assigned_to_id;
                if reviewed.contains(&developer_id) || !seen.insert(developer_id) {
                    continue;
                }
                pending.push(PendingReview {
                    project_id: project.id,
                    project_name: project.internal_name.clone(),
                    manager_id: project.manager_id,
                    developer_id,
                });
            }
        }
        Ok(pending)
    }

    /// Counts over the last seven days plus the current backlog.
    pub async fn weekly_summary(&self, actor: &Actor) -> WorkflowResult<WeeklySummary> {
        policy::require_admin(actor, "query the weekly summary")?;
        let now = Utc::now();
        let cutoff = now - Duration::days(SUMMARY_WINDOW_DAYS);

        let mut tx = self.begin().await?;
        let projects = tx.list_projects(&ProjectFilter::default()).await?;
        let tasks = tx.list_tasks(&TaskFilter::default()).await?;
        let revisions = tx.list_revisions(&RevisionFilter::default()).await?;

        Ok(WeeklySummary {
            since: Some(cutoff),
            projects_created: projects.iter().filter(|p| p.created_at >= cutoff).count(),
            projects_completed: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed && since(p.completed_at, cutoff))
                .count(),
            tasks_created: tasks.iter().filter(|t| t.created_at >= cutoff).count(),
            tasks_approved: tasks.iter().filter(|t| since(t.approved_at, cutoff)).count(),
            revisions_created: revisions.iter().filter(|r| r.created_at >= cutoff).count(),
            revisions_completed: revisions
                .iter()
                .filter(|r| r.status == RevisionStatus::Completed && since(r.completed_at, cutoff))
                .count(),
            active_projects: projects.iter().filter(|p| !p.status.is_terminal()).count(),
            overdue_tasks: tasks.iter().filter(|t| is_overdue(t, now)).count(),
        })
    }

    /// Move a project to `target` through the matching transition.
    ///
    /// IN_PROGRESS resumes a held project and otherwise records a client
    /// change request. NEW and REQUIREMENTS_PENDING are only ever derived.
    pub async fn project_status_update(
        &self,
        actor: &Actor,
        project_id: DbId,
        target: ProjectStatus,
    ) -> WorkflowResult<Project> {
        policy::require_admin(actor, "update project status through automation")?;

        let action = match target {
            ProjectStatus::Review => return self.mark_delivered(actor, project_id).await,
            ProjectStatus::ClientReview => ProjectAction::SendToClient,
            ProjectStatus::InProgress => {
                let mut tx = self.begin().await?;
                let current = load::project(tx.as_mut(), project_id).await?.status;
                if current == ProjectStatus::OnHold {
                    ProjectAction::Resume
                } else {
                    ProjectAction::ClientRequestsChanges
                }
            }
            ProjectStatus::Completed => ProjectAction::MarkCompleted,
            ProjectStatus::OnHold => ProjectAction::Hold,
            ProjectStatus::Cancelled => ProjectAction::Cancel,
            ProjectStatus::New | ProjectStatus::RequirementsPending => {
                return Err(CoreError::validation(format!(
                    "{target} cannot be set directly; it follows from requirements"
                ))
                .into())
            }
        };
        self.fire_project(actor, project_id, action).await
    }

    /// Fan a REMINDER notification out. Best-effort per recipient.
    pub async fn send_reminder(&self, actor: &Actor, reminder: Reminder) -> WorkflowResult<DispatchReport> {
        policy::require_admin(actor, "send reminders")?;
        if reminder.title.trim().is_empty() {
            return Err(CoreError::validation("Reminder title must not be empty").into());
        }
        if matches!(&reminder.recipients, Recipients::Users(ids) if ids.is_empty()) {
            return Err(CoreError::validation("Reminder needs at least one recipient").into());
        }

        let mut draft = NotificationDraft::new(NotificationKind::Reminder, reminder.title, reminder.message);
        draft.reference = reminder.reference;
        let report = self
            .dispatcher
            .dispatch(vec![Effect::Notify {
                recipients: reminder.recipients,
                draft,
            }])
            .await;

        tracing::info!(delivered = report.notifications, failed = report.failed_notifications, "Reminder sent");
        Ok(report)
    }
}
