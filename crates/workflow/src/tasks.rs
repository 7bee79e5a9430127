//! Developer tasks and the task → project promotion cascade.

use agency_core::channels::{Channel, EventName};
use agency_core::effects::{Effect, EntityKind, NotificationDraft, NotificationKind};
use agency_core::error::CoreError;
use agency_core::policy::{self, Action, Subject};
use agency_core::project::{self, ProjectStatus};
use agency_core::roles::{Actor, Role};
use agency_core::task::{self, TaskAction, TaskStatus};
use agency_core::types::{DbId, Timestamp};
use agency_db::models::project::Project;
use agency_db::models::task::{NewTask, Task, TaskFilter, UpdateTask};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::access;
use crate::error::WorkflowResult;
use crate::load;
use crate::projects::apply_status;
use crate::Workflow;

/// Input for `createTask`; the assigning team lead is the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: DbId,
    #[serde(default)]
    pub priority: i16,
    pub due_date: Option<Timestamp>,
}

/// Developer's hand-in for `submit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSubmission {
    pub notes: Option<String>,
    pub url: Option<String>,
}

pub(crate) fn subject(project: &Project, task: &Task) -> Subject {
    Subject::project(project.scope()).with_assignee(Some(task.assigned_to_id))
}

fn status_changed(task: &Task, previous: TaskStatus) -> Effect {
    Effect::publish(
        Channel::Project(task.project_id),
        EventName::TaskStatusChanged,
        json!({
            "task_id": task.id,
            "project_id": task.project_id,
            "status": task.status,
            "previous_status": previous,
        }),
    )
}

fn assigned(task: &Task, project: &Project) -> Vec<Effect> {
    let payload = json!({
        "task_id": task.id,
        "project_id": task.project_id,
        "title": task.title,
        "assigned_to_id": task.assigned_to_id,
    });
    vec![
        Effect::notify_user(
            task.assigned_to_id,
            NotificationDraft::new(
                NotificationKind::TaskAssigned,
                "New task assigned",
                format!("\"{}\" on project \"{}\"", task.title, project.internal_name),
            )
            .about(EntityKind::Task, task.id),
        ),
        Effect::publish(Channel::User(task.assigned_to_id), EventName::TaskAssigned, payload.clone()),
        Effect::publish(Channel::Project(task.project_id), EventName::TaskAssigned, payload),
    ]
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::validation("Task title must not be empty"));
    }
    Ok(())
}

impl Workflow {
    pub async fn create_task(
        &self,
        actor: &Actor,
        project_id: DbId,
        input: CreateTask,
    ) -> WorkflowResult<Task> {
        let mut tx = self.begin().await?;
        let project = load::locked_project(tx.as_mut(), project_id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Task(TaskAction::Create),
        )?;
        project::ensure_editable(project.status)?;
        validate_title(&input.title)?;
        task::validate_priority(input.priority)?;
        load::active_user_with_role(tx.as_mut(), input.assigned_to_id, Role::Developer).await?;

        let task = tx
            .insert_task(&NewTask {
                project_id,
                title: input.title,
                description: input.description,
                assigned_to_id: input.assigned_to_id,
                assigned_by_id: actor.user_id,
                priority: input.priority,
                due_date: input.due_date,
            })
            .await?;
        let effects = assigned(&task, &project);
        self.commit(tx, effects).await?;

        tracing::info!(task_id = task.id, project_id, assigned_to_id = task.assigned_to_id, "Task created");
        Ok(task)
    }

    pub async fn get_task(&self, actor: &Actor, id: DbId) -> WorkflowResult<Task> {
        let mut tx = self.begin().await?;
        let task = load::task(tx.as_mut(), id).await?;
        let project = load::project(tx.as_mut(), task.project_id).await?;
        access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        Ok(task)
    }

    /// Tasks of one project, or across projects for the caller's own work.
    pub async fn list_tasks(&self, actor: &Actor, filter: &TaskFilter) -> WorkflowResult<Vec<Task>> {
        let mut tx = self.begin().await?;
        let mut filter = *filter;
        match filter.project_id {
            Some(project_id) => {
                let project = load::project(tx.as_mut(), project_id).await?;
                access::ensure_can_view(tx.as_mut(), actor, &project).await?;
            }
            None if !actor.is_admin() => filter.assigned_to_id = Some(actor.user_id),
            None => {}
        }
        Ok(tx.list_tasks(&filter).await?)
    }

    pub async fn update_task(&self, actor: &Actor, id: DbId, input: UpdateTask) -> WorkflowResult<Task> {
        let mut tx = self.begin().await?;
        let (project, mut task) = load::task_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &task), Action::Task(TaskAction::Update))?;
        task::ensure_mutable(task.status)?;
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(priority) = input.priority {
            task::validate_priority(priority)?;
        }
        let reassigned = input
            .assigned_to_id
            .filter(|new_id| *new_id != task.assigned_to_id);
        if let Some(new_id) = reassigned {
            load::active_user_with_role(tx.as_mut(), new_id, Role::Developer).await?;
        }

        input.apply(&mut task);
        let task = tx.update_task(&task).await?;
        let effects = if reassigned.is_some() {
            assigned(&task, &project)
        } else {
            Vec::new()
        };
        self.commit(tx, effects).await?;

        tracing::info!(task_id = id, "Task updated");
        Ok(task)
    }

    pub async fn delete_task(&self, actor: &Actor, id: DbId) -> WorkflowResult<()> {
        let mut tx = self.begin().await?;
        let (project, task) = load::task_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &task), Action::Task(TaskAction::Delete))?;
        task::ensure_mutable(task.status)?;
        tx.delete_task(id).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(task_id = id, project_id = project.id, "Task deleted");
        Ok(())
    }

    pub async fn start_task(&self, actor: &Actor, id: DbId) -> WorkflowResult<Task> {
        let mut tx = self.begin().await?;
        let (project, mut task) = load::task_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &task), Action::Task(TaskAction::Start))?;

        let previous = task.status;
        task.status = task::next_status(previous, TaskAction::Start)?;
        let task = tx.update_task(&task).await?;
        let effects = vec![status_changed(&task, previous)];
        self.commit(tx, effects).await?;

        tracing::info!(task_id = id, "Task started");
        Ok(task)
    }

    pub async fn submit_task(
        &self,
        actor: &Actor,
        id: DbId,
        submission: TaskSubmission,
    ) -> WorkflowResult<Task> {
        let mut tx = self.begin().await?;
        let (project, mut task) = load::task_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &task), Action::Task(TaskAction::Submit))?;

        let previous = task.status;
        task.status = task::next_status(previous, TaskAction::Submit)?;
        task.submission_notes = submission.notes;
        task.submission_url = submission.url;
        task.submitted_at = Some(Utc::now());
        let task = tx.update_task(&task).await?;

        let mut effects = vec![status_changed(&task, previous)];
        if let Some(lead) = project.team_lead_id {
            effects.push(Effect::notify_user(
                lead,
                NotificationDraft::new(
                    NotificationKind::TaskSubmitted,
                    "Task submitted",
                    format!("\"{}\" is ready for review", task.title),
                )
                .about(EntityKind::Task, task.id),
            ));
        }
        self.commit(tx, effects).await?;

        tracing::info!(task_id = id, "Task submitted");
        Ok(task)
    }

    /// Approve a submitted task. When it is the last unapproved task of a
    /// working project, the project moves to REVIEW in the same transaction.
    pub async fn approve_task(&self, actor: &Actor, id: DbId) -> WorkflowResult<Task> {
        let mut tx = self.begin().await?;
        let (project, mut task) = load::task_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &task), Action::Task(TaskAction::Approve))?;

        let previous = task.status;
        task.status = task::next_status(previous, TaskAction::Approve)?;
        task.approved_at = Some(Utc::now());
        task.rejection_reason = None;
        let task = tx.update_task(&task).await?;

        let mut effects = vec![
            status_changed(&task, previous),
            Effect::notify_user(
                task.assigned_to_id,
                NotificationDraft::new(
                    NotificationKind::TaskApproved,
                    "Task approved",
                    format!("\"{}\" was approved", task.title),
                )
                .about(EntityKind::Task, task.id),
            ),
        ];

        let siblings: Vec<TaskStatus> = tx
            .list_tasks(&TaskFilter::for_project(project.id))
            .await?
            .iter()
            .map(|t| t.status)
            .collect();
        if let Some(next) = project::after_task_approved(project.status, &siblings) {
            let (project, status_effects) = apply_status(tx.as_mut(), project, next).await?;
            effects.extend(status_effects);
            if next == ProjectStatus::Review {
                effects.push(Effect::notify_user(
                    project.manager_id,
                    NotificationDraft::new(
                        NotificationKind::ProjectReadyForReview,
                        "Project ready for review",
                        format!("Every task on \"{}\" is approved", project.internal_name),
                    )
                    .about(EntityKind::Project, project.id),
                ));
                tracing::info!(project_id = project.id, "All tasks approved, project moved to review");
            }
        }
        self.commit(tx, effects).await?;

        tracing::info!(task_id = id, "Task approved");
        Ok(task)
    }

    pub async fn reject_task(&self, actor: &Actor, id: DbId, reason: String) -> WorkflowResult<Task> {
        if reason.trim().is_empty() {
            return Err(CoreError::validation("A rejection reason is required").into());
        }
        let mut tx = self.begin().await?;
        let (project, mut task) = load::task_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &task), Action::Task(TaskAction::Reject))?;

        let previous = task.status;
        task.status = task::next_status(previous, TaskAction::Reject)?;
        task.rejection_reason = Some(reason);
        let task = tx.update_task(&task).await?;

        let effects = vec![
            status_changed(&task, previous),
            Effect::notify_user(
                task.assigned_to_id,
                NotificationDraft::new(
                    NotificationKind::TaskRejected,
                    "Task needs changes",
                    format!("\"{}\" was sent back", task.title),
                )
                .about(EntityKind::Task, task.id),
            ),
        ];
        self.commit(tx, effects).await?;

        tracing::info!(task_id = id, "Task rejected");
        Ok(task)
    }
}
