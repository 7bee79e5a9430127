//! Post-delivery revisions: a three-actor hand-off from manager to team
//! lead to developer and back, plus the FIFO work queues over them.

use agency_core::channels::{Channel, EventName};
use agency_core::effects::{Effect, EntityKind, NotificationDraft, NotificationKind};
use agency_core::error::CoreError;
use agency_core::policy::{self, Action, Subject};
use agency_core::project;
use agency_core::revision::{self, QueueOrder, RevisionAction, RevisionQueue};
use agency_core::roles::{Actor, Role};
use agency_core::suggestion::{self, Ranking};
use agency_core::types::{DbId, Timestamp};
use agency_db::models::project::Project;
use agency_db::models::revision::{NewRevision, Revision, RevisionFilter};
use agency_db::models::task::TaskFilter;
use agency_db::models::user::UserFilter;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::access;
use crate::error::WorkflowResult;
use crate::load;
use crate::projects::apply_status;
use crate::Workflow;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRevision {
    pub description: String,
    #[serde(default)]
    pub is_paid: bool,
}

pub(crate) fn subject(project: &Project, revision: &Revision) -> Subject {
    Subject::project(project.scope())
        .with_assignee(revision.assigned_developer_id)
        .with_creator(Some(revision.created_by_id))
        .with_team_lead(revision.assigned_team_lead_id)
}

fn revision_payload(revision: &Revision) -> serde_json::Value {
    json!({
        "revision_id": revision.id,
        "project_id": revision.project_id,
        "status": revision.status,
        "assigned_team_lead_id": revision.assigned_team_lead_id,
        "assigned_developer_id": revision.assigned_developer_id,
        "manager_accepted": revision.manager_accepted,
    })
}

/// Publish one revision event on the project channel and on each listed
/// user channel.
fn broadcast(revision: &Revision, event: EventName, users: &[Option<DbId>]) -> Vec<Effect> {
    let payload = revision_payload(revision);
    let mut effects = vec![Effect::publish(
        Channel::Project(revision.project_id),
        event,
        payload.clone(),
    )];
    for user in users.iter().flatten() {
        effects.push(Effect::publish(Channel::User(*user), event, payload.clone()));
    }
    effects
}

fn queue_key(order: QueueOrder) -> impl Fn(&Revision) -> (Option<Timestamp>, DbId) {
    move |r: &Revision| {
        let at = match order {
            QueueOrder::CreatedAt => Some(r.created_at),
            QueueOrder::SubmittedAt => r.submitted_at,
            QueueOrder::CompletedAt => r.completed_at,
        };
        (at, r.id)
    }
}

impl Workflow {
    /// Open a revision. The project's current team lead is copied onto it
    /// and the project is forced into CLIENT_REVIEW, reopening it when it
    /// was already completed.
    pub async fn create_revision(
        &self,
        actor: &Actor,
        project_id: DbId,
        input: CreateRevision,
    ) -> WorkflowResult<Revision> {
        let mut tx = self.begin().await?;
        let project = load::locked_project(tx.as_mut(), project_id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Revision(RevisionAction::Create),
        )?;
        if input.description.trim().is_empty() {
            return Err(CoreError::validation("Revision description must not be empty").into());
        }
        let next = project::on_revision_created(project.status)?;

        let revision = tx
            .insert_revision(&NewRevision {
                project_id,
                created_by_id: actor.user_id,
                assigned_team_lead_id: project.team_lead_id,
                description: input.description,
                is_paid: input.is_paid,
            })
            .await?;

        let mut effects = Vec::new();
        if let Some(lead) = revision.assigned_team_lead_id {
            effects.push(Effect::notify_user(
                lead,
                NotificationDraft::new(
                    NotificationKind::RevisionCreated,
                    "New revision",
                    format!("A revision was opened on \"{}\"", project.internal_name),
                )
                .about(EntityKind::Revision, revision.id),
            ));
            effects.push(Effect::publish(
                Channel::User(lead),
                EventName::RevisionPendingNew,
                revision_payload(&revision),
            ));
        }
        effects.push(Effect::publish(
            Channel::Project(project_id),
            EventName::RevisionCreated,
            revision_payload(&revision),
        ));
        if project.status != next {
            let (_, status_effects) = apply_status(tx.as_mut(), project, next).await?;
            effects.extend(status_effects);
        }
        self.commit(tx, effects).await?;

        tracing::info!(revision_id = revision.id, project_id, "Revision created");
        Ok(revision)
    }

    pub async fn get_revision(&self, actor: &Actor, id: DbId) -> WorkflowResult<Revision> {
        let mut tx = self.begin().await?;
        let revision = load::revision(tx.as_mut(), id).await?;
        let project = load::project(tx.as_mut(), revision.project_id).await?;
        access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        Ok(revision)
    }

    pub async fn list_revisions(&self, actor: &Actor, project_id: DbId) -> WorkflowResult<Vec<Revision>> {
        let mut tx = self.begin().await?;
        let project = load::project(tx.as_mut(), project_id).await?;
        access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        let mut revisions = tx.list_revisions(&RevisionFilter::for_project(project_id)).await?;
        revision::fifo_sort(&mut revisions, queue_key(QueueOrder::CreatedAt));
        Ok(revisions)
    }

    /// Hand a pending revision to a developer. Assignment implies start.
    pub async fn assign_revision_developer(
        &self,
        actor: &Actor,
        id: DbId,
        developer_id: DbId,
    ) -> WorkflowResult<Revision> {
        let mut tx = self.begin().await?;
        let (project, mut revision) = load::revision_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &subject(&project, &revision),
            Action::Revision(RevisionAction::AssignDeveloper),
        )?;
        let next = revision::assign_developer(revision.status, revision.assigned_developer_id)?;
        load::active_user_with_role(tx.as_mut(), developer_id, Role::Developer).await?;

        revision.assigned_developer_id = Some(developer_id);
        revision.status = next;
        let revision = tx.update_revision(&revision).await?;

        let mut effects = vec![Effect::notify_user(
            developer_id,
            NotificationDraft::new(
                NotificationKind::RevisionAssigned,
                "Revision assigned",
                format!("You have a revision on \"{}\"", project.internal_name),
            )
            .about(EntityKind::Revision, revision.id),
        )];
        effects.extend(broadcast(&revision, EventName::RevisionAssigned, &[Some(developer_id)]));
        self.commit(tx, effects).await?;

        tracing::info!(revision_id = id, developer_id, "Revision assigned");
        Ok(revision)
    }

    pub async fn start_revision(&self, actor: &Actor, id: DbId) -> WorkflowResult<Revision> {
        let mut tx = self.begin().await?;
        let (project, mut revision) = load::revision_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &revision), Action::Revision(RevisionAction::Start))?;

        revision.status = revision::start(revision.status, revision.assigned_developer_id)?;
        let revision = tx.update_revision(&revision).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(revision_id = id, "Revision started");
        Ok(revision)
    }

    pub async fn submit_revision(
        &self,
        actor: &Actor,
        id: DbId,
        message: Option<String>,
    ) -> WorkflowResult<Revision> {
        let mut tx = self.begin().await?;
        let (project, mut revision) = load::revision_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &revision), Action::Revision(RevisionAction::Submit))?;

        revision.status = revision::next_status(revision.status, RevisionAction::Submit)?;
        revision.developer_message = message;
        revision.submitted_at = Some(Utc::now());
        let revision = tx.update_revision(&revision).await?;

        let mut effects = Vec::new();
        if let Some(lead) = revision.assigned_team_lead_id {
            effects.push(Effect::notify_user(
                lead,
                NotificationDraft::new(
                    NotificationKind::RevisionSubmitted,
                    "Revision submitted",
                    format!("A revision on \"{}\" is ready for review", project.internal_name),
                )
                .about(EntityKind::Revision, revision.id),
            ));
        }
        effects.extend(broadcast(
            &revision,
            EventName::RevisionSubmitted,
            &[revision.assigned_team_lead_id],
        ));
        self.commit(tx, effects).await?;

        tracing::info!(revision_id = id, "Revision submitted");
        Ok(revision)
    }

    pub async fn complete_revision(&self, actor: &Actor, id: DbId) -> WorkflowResult<Revision> {
        let mut tx = self.begin().await?;
        let (project, mut revision) = load::revision_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &subject(&project, &revision),
            Action::Revision(RevisionAction::Complete),
        )?;

        revision.status = revision::next_status(revision.status, RevisionAction::Complete)?;
        revision.completed_at = Some(Utc::now());
        let revision = tx.update_revision(&revision).await?;

        let mut effects = vec![Effect::notify_user(
            revision.created_by_id,
            NotificationDraft::new(
                NotificationKind::RevisionCompleted,
                "Revision completed",
                format!("A revision on \"{}\" is waiting for your acceptance", project.internal_name),
            )
            .about(EntityKind::Revision, revision.id),
        )];
        effects.extend(broadcast(
            &revision,
            EventName::RevisionCompleted,
            &[Some(revision.created_by_id)],
        ));
        self.commit(tx, effects).await?;

        tracing::info!(revision_id = id, "Revision completed");
        Ok(revision)
    }

    /// `managerAccept`: one-way acceptance of a completed revision. When it
    /// was the last outstanding revision, the project completes if every
    /// task is approved and goes back to IN_PROGRESS otherwise.
    pub async fn accept_revision(&self, actor: &Actor, id: DbId) -> WorkflowResult<Revision> {
        let mut tx = self.begin().await?;
        let (project, mut revision) = load::revision_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &subject(&project, &revision),
            Action::Revision(RevisionAction::ManagerAccept),
        )?;
        revision::manager_accept(revision.status, revision.manager_accepted)?;

        revision.manager_accepted = true;
        revision.accepted_at = Some(Utc::now());
        let revision = tx.update_revision(&revision).await?;

        let outstanding = tx
            .list_revisions(&RevisionFilter::for_project(project.id))
            .await?
            .iter()
            .filter(|r| revision::is_outstanding(r.status, r.manager_accepted))
            .count();
        let tasks: Vec<_> = tx
            .list_tasks(&TaskFilter::for_project(project.id))
            .await?
            .iter()
            .map(|t| t.status)
            .collect();

        let mut effects = Vec::new();
        if let Some(next) = project::after_revision_accepted(project.status, outstanding, &tasks) {
            let (project, status_effects) = apply_status(tx.as_mut(), project, next).await?;
            effects.extend(status_effects);
            tracing::info!(project_id = project.id, status = %project.status, "Revisions settled");
        }
        self.commit(tx, effects).await?;

        tracing::info!(revision_id = id, outstanding, "Revision accepted");
        Ok(revision)
    }

    pub async fn delete_revision(&self, actor: &Actor, id: DbId) -> WorkflowResult<()> {
        let mut tx = self.begin().await?;
        let (project, revision) = load::revision_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &revision), Action::Revision(RevisionAction::Delete))?;
        revision::ensure_deletable(revision.status)?;
        tx.delete_revision(id).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(revision_id = id, project_id = project.id, "Revision deleted");
        Ok(())
    }

    /// Rank active developers for a revision on this project. Advisory only:
    /// assignment does not enforce the recommendation.
    pub async fn suggest_developers(&self, actor: &Actor, project_id: DbId) -> WorkflowResult<Ranking> {
        let mut tx = self.begin().await?;
        let project = load::project(tx.as_mut(), project_id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Revision(RevisionAction::AssignDeveloper),
        )?;

        let developers: Vec<_> = tx
            .list_users(&UserFilter::active(Role::Developer))
            .await?
            .into_iter()
            .map(|u| (u.id, u.name, u.tier))
            .collect();
        let assignees: Vec<DbId> = tx
            .list_tasks(&TaskFilter::for_project(project_id))
            .await?
            .iter()
            .map(|t| t.assigned_to_id)
            .collect();
        let counts = tx.active_task_counts().await?;

        Ok(suggestion::rank(suggestion::build_candidates(
            &developers,
            &assignees,
            &counts,
        )))
    }

    /// One actor-scoped FIFO queue. Team leads see revisions copied to them,
    /// managers the ones they opened, developers their own; admins see all.
    pub async fn revision_queue(
        &self,
        actor: &Actor,
        queue: RevisionQueue,
    ) -> WorkflowResult<Vec<Revision>> {
        let mut filter = RevisionFilter::default();
        let scoped = (!actor.is_admin()).then_some(actor.user_id);
        let owner = match queue {
            RevisionQueue::PendingForTeamLead | RevisionQueue::SubmittedForTeamLead => {
                filter.assigned_team_lead_id = scoped;
                Role::TeamLead
            }
            RevisionQueue::CompletedForManager => {
                filter.created_by_id = scoped;
                Role::Manager
            }
            RevisionQueue::AssignedToDeveloper => {
                filter.assigned_developer_id = scoped;
                Role::Developer
            }
        };
        if !actor.is_admin() && actor.role != owner {
            return Err(CoreError::Forbidden(format!("The {queue} queue belongs to {owner} users")).into());
        }

        let mut tx = self.begin().await?;
        let mut revisions: Vec<Revision> = tx
            .list_revisions(&filter)
            .await?
            .into_iter()
            .filter(|r| {
                revision::queue_of(r.status, r.manager_accepted, r.assigned_developer_id) == Some(queue)
            })
            .collect();
        revision::fifo_sort(&mut revisions, queue_key(queue.order()));
        Ok(revisions)
    }
}
