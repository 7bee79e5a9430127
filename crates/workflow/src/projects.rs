//! Project administration and manual project transitions.

use agency_core::channels::{Channel, EventName};
use agency_core::effects::{Effect, EntityKind, NotificationDraft, NotificationKind};
use agency_core::error::CoreError;
use agency_core::policy::{self, Action, ProjectScope, Subject};
use agency_core::project::{self, ProjectAction, ProjectStatus};
use agency_core::revision::RevisionStatus;
use agency_core::roles::{Actor, Role};
use agency_core::types::DbId;
use agency_db::models::fiverr_account::{FiverrAccount, NewFiverrAccount};
use agency_db::models::project::{NewProject, Project, ProjectFilter, UpdateProject};
use agency_db::models::review::ReviewFilter;
use agency_db::models::revision::{Revision, RevisionFilter};
use agency_db::models::task::TaskFilter;
use agency_db::models::user::UserFilter;
use agency_db::StoreTx;
use chrono::Utc;
use serde_json::json;

use crate::access;
use crate::error::WorkflowResult;
use crate::load;
use crate::reviews;
use crate::Workflow;

/// `project:updated` on the project channel.
pub(crate) fn project_updated(project: &Project, previous: ProjectStatus) -> Effect {
    Effect::publish(
        Channel::Project(project.id),
        EventName::ProjectUpdated,
        json!({
            "project_id": project.id,
            "status": project.status,
            "previous_status": previous,
        }),
    )
}

/// Effects of a project reaching COMPLETED: every admin and participant is
/// notified, and `project:completed` goes out on the project channel and on
/// each active admin's user channel.
pub(crate) async fn project_completed(
    tx: &mut dyn StoreTx,
    project: &Project,
) -> WorkflowResult<Vec<Effect>> {
    let draft = NotificationDraft::new(
        NotificationKind::ProjectCompleted,
        "Project completed",
        format!("Project \"{}\" has been completed", project.internal_name),
    )
    .about(EntityKind::Project, project.id);
    let payload = json!({ "project_id": project.id, "completed_at": project.completed_at });

    let mut effects = vec![
        Effect::notify_role(Role::Admin, draft.clone()),
        Effect::notify_users(project.participants(), draft),
        Effect::publish(
            Channel::Project(project.id),
            EventName::ProjectCompleted,
            payload.clone(),
        ),
    ];
    for admin in tx.list_users(&UserFilter::active(Role::Admin)).await? {
        effects.push(Effect::publish(
            Channel::User(admin.id),
            EventName::ProjectCompleted,
            payload.clone(),
        ));
    }
    Ok(effects)
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("Project name must not be empty"));
    }
    Ok(())
}

fn validate_budget(budget_cents: Option<i64>) -> Result<(), CoreError> {
    if budget_cents.is_some_and(|b| b < 0) {
        return Err(CoreError::validation("Budget must not be negative"));
    }
    Ok(())
}

impl Workflow {
    pub async fn create_project(&self, actor: &Actor, input: NewProject) -> WorkflowResult<Project> {
        let subject = Subject::project(ProjectScope {
            manager_id: input.manager_id,
            ..ProjectScope::default()
        });
        policy::authorize(actor, &subject, Action::Project(ProjectAction::Create))?;
        validate_name(&input.internal_name)?;
        validate_budget(input.budget_cents)?;

        let mut tx = self.begin().await?;
        tx.get_fiverr_account(input.fiverr_account_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "FiverrAccount",
                id: input.fiverr_account_id,
            })?;
        load::active_user_with_role(tx.as_mut(), input.manager_id, Role::Manager).await?;

        let project = tx.insert_project(&input).await?;
        let effects = vec![Effect::notify_user(
            project.manager_id,
            NotificationDraft::new(
                NotificationKind::ProjectAssigned,
                "New project",
                format!("You are managing project \"{}\"", project.internal_name),
            )
            .about(EntityKind::Project, project.id),
        )];
        self.commit(tx, effects).await?;

        tracing::info!(project_id = project.id, manager_id = project.manager_id, "Project created");
        Ok(project)
    }

    pub async fn get_project(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        let mut tx = self.begin().await?;
        let project = load::project(tx.as_mut(), id).await?;
        access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        Ok(project)
    }

    /// Projects visible to the actor, narrowed by `filter`.
    pub async fn list_projects(
        &self,
        actor: &Actor,
        filter: &ProjectFilter,
    ) -> WorkflowResult<Vec<Project>> {
        let mut tx = self.begin().await?;
        let mut filter = *filter;
        match actor.role {
            Role::Admin | Role::Developer => {}
            Role::Manager => filter.manager_id = Some(actor.user_id),
            Role::TeamLead => filter.team_lead_id = Some(actor.user_id),
            Role::Designer => filter.designer_id = Some(actor.user_id),
        }
        let projects = tx.list_projects(&filter).await?;
        if actor.role != Role::Developer {
            return Ok(projects);
        }

        let mut visible = Vec::with_capacity(projects.len());
        for project in projects {
            if access::can_view(tx.as_mut(), actor, &project).await? {
                visible.push(project);
            }
        }
        Ok(visible)
    }

    pub async fn update_project(
        &self,
        actor: &Actor,
        id: DbId,
        input: UpdateProject,
    ) -> WorkflowResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = load::locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Project(ProjectAction::Update),
        )?;
        project::ensure_editable(project.status)?;
        if let Some(name) = &input.internal_name {
            validate_name(name)?;
        }
        validate_budget(input.budget_cents)?;

        input.apply(&mut project);
        let project = tx.update_project(&project).await?;
        let effects = vec![project_updated(&project, project.status)];
        self.commit(tx, effects).await?;

        tracing::info!(project_id = id, "Project updated");
        Ok(project)
    }

    pub async fn assign_team_lead(
        &self,
        actor: &Actor,
        id: DbId,
        team_lead_id: DbId,
    ) -> WorkflowResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = load::locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Project(ProjectAction::AssignTeamLead),
        )?;
        project::ensure_editable(project.status)?;
        load::active_user_with_role(tx.as_mut(), team_lead_id, Role::TeamLead).await?;

        let previous = project.status;
        project.team_lead_id = Some(team_lead_id);
        if let Some(next) = project::after_team_lead_assigned(previous) {
            project.status = next;
        }
        let project = tx.update_project(&project).await?;

        let mut effects = vec![
            Effect::notify_user(
                team_lead_id,
                NotificationDraft::new(
                    NotificationKind::ProjectAssigned,
                    "Project assigned",
                    format!("You are the team lead on \"{}\"", project.internal_name),
                )
                .about(EntityKind::Project, project.id),
            ),
            project_updated(&project, previous),
        ];

        // Revisions opened before the project had a lead are copied to this one.
        let orphaned: Vec<Revision> = tx
            .list_revisions(&RevisionFilter::for_project(id))
            .await?
            .into_iter()
            .filter(|r| r.assigned_team_lead_id.is_none() && r.status != RevisionStatus::Completed)
            .collect();
        for mut revision in orphaned.iter().cloned() {
            revision.assigned_team_lead_id = Some(team_lead_id);
            let revision = tx.update_revision(&revision).await?;
            if revision.status == RevisionStatus::Pending {
                effects.push(Effect::publish(
                    Channel::User(team_lead_id),
                    EventName::RevisionPendingNew,
                    json!({
                        "revision_id": revision.id,
                        "project_id": revision.project_id,
                        "status": revision.status,
                        "assigned_team_lead_id": revision.assigned_team_lead_id,
                    }),
                ));
            }
        }
        self.commit(tx, effects).await?;

        tracing::info!(
            project_id = id,
            team_lead_id,
            status = %project.status,
            revisions = orphaned.len(),
            "Team lead assigned"
        );
        Ok(project)
    }

    pub async fn assign_designer(
        &self,
        actor: &Actor,
        id: DbId,
        designer_id: DbId,
    ) -> WorkflowResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = load::locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Project(ProjectAction::AssignDesigner),
        )?;
        project::ensure_editable(project.status)?;
        load::active_user_with_role(tx.as_mut(), designer_id, Role::Designer).await?;

        project.designer_id = Some(designer_id);
        let project = tx.update_project(&project).await?;

        let effects = vec![
            Effect::notify_user(
                designer_id,
                NotificationDraft::new(
                    NotificationKind::ProjectAssigned,
                    "Project assigned",
                    format!("You are the designer on \"{}\"", project.internal_name),
                )
                .about(EntityKind::Project, project.id),
            ),
            project_updated(&project, project.status),
        ];
        self.commit(tx, effects).await?;

        tracing::info!(project_id = id, designer_id, "Designer assigned");
        Ok(project)
    }

    /// `markDelivered`: team lead hands an all-approved project to review.
    pub async fn mark_delivered(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = load::locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Project(ProjectAction::MarkDelivered),
        )?;

        let tasks = tx.list_tasks(&TaskFilter::for_project(id)).await?;
        let statuses: Vec<_> = tasks.iter().map(|t| t.status).collect();
        let previous = project.status;
        project.status = project::mark_delivered(previous, &statuses)?;
        let project = tx.update_project(&project).await?;

        let effects = vec![
            Effect::notify_user(
                project.manager_id,
                NotificationDraft::new(
                    NotificationKind::ProjectReadyForReview,
                    "Project ready for review",
                    format!("\"{}\" has been delivered for review", project.internal_name),
                )
                .about(EntityKind::Project, project.id),
            ),
            project_updated(&project, previous),
        ];
        self.commit(tx, effects).await?;

        tracing::info!(project_id = id, "Project delivered for review");
        Ok(project)
    }

    pub async fn send_to_client(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        self.fire_project(actor, id, ProjectAction::SendToClient).await
    }

    pub async fn client_requests_changes(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        self.fire_project(actor, id, ProjectAction::ClientRequestsChanges).await
    }

    pub async fn mark_completed(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        self.fire_project(actor, id, ProjectAction::MarkCompleted).await
    }

    pub async fn hold_project(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        self.fire_project(actor, id, ProjectAction::Hold).await
    }

    pub async fn resume_project(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        self.fire_project(actor, id, ProjectAction::Resume).await
    }

    pub async fn cancel_project(&self, actor: &Actor, id: DbId) -> WorkflowResult<Project> {
        self.fire_project(actor, id, ProjectAction::Cancel).await
    }

    /// Manual transitions that only touch the project row.
    pub(crate) async fn fire_project(
        &self,
        actor: &Actor,
        id: DbId,
        action: ProjectAction,
    ) -> WorkflowResult<Project> {
        let mut tx = self.begin().await?;
        let project = load::locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &Subject::project(project.scope()), Action::Project(action))?;

        let next = project::next_status(project.status, action)?;
        let (project, effects) = apply_status(tx.as_mut(), project, next).await?;
        self.commit(tx, effects).await?;

        tracing::info!(project_id = id, action = %action, status = %project.status, "Project transition");
        Ok(project)
    }

    /// Remove a project and everything hanging off it.
    pub async fn delete_project(&self, actor: &Actor, id: DbId) -> WorkflowResult<()> {
        let mut tx = self.begin().await?;
        let project = load::locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Project(ProjectAction::Delete),
        )?;

        // Reviews go with the project; their developers' tiers must follow.
        let mut reviewed: Vec<DbId> = tx
            .list_reviews(&ReviewFilter {
                project_id: Some(id),
                ..ReviewFilter::default()
            })
            .await?
            .iter()
            .map(|r| r.developer_id)
            .collect();
        reviewed.sort_unstable();
        reviewed.dedup();

        tx.delete_project(id).await?;
        for developer_id in &reviewed {
            reviews::recalculate(tx.as_mut(), *developer_id).await?;
        }
        self.commit(tx, Vec::new()).await?;

        tracing::info!(project_id = id, recalculated = reviewed.len(), "Project deleted");
        Ok(())
    }

    pub async fn create_fiverr_account(
        &self,
        actor: &Actor,
        input: NewFiverrAccount,
    ) -> WorkflowResult<FiverrAccount> {
        policy::require_admin(actor, "manage Fiverr accounts")?;
        if input.name.trim().is_empty() {
            return Err(CoreError::validation("Account name must not be empty").into());
        }

        let mut tx = self.begin().await?;
        let account = tx.insert_fiverr_account(&input).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(account_id = account.id, name = %account.name, "Fiverr account created");
        Ok(account)
    }

    pub async fn list_fiverr_accounts(&self, actor: &Actor) -> WorkflowResult<Vec<FiverrAccount>> {
        if !matches!(actor.role, Role::Admin | Role::Manager) {
            return Err(CoreError::Forbidden("Only admins and managers can view Fiverr accounts".into()).into());
        }
        let mut tx = self.begin().await?;
        Ok(tx.list_fiverr_accounts().await?)
    }
}

/// Write a new project status and collect the effects that go with it.
pub(crate) async fn apply_status(
    tx: &mut dyn StoreTx,
    mut project: Project,
    next: ProjectStatus,
) -> WorkflowResult<(Project, Vec<Effect>)> {
    let previous = project.status;
    project.status = next;
    match next {
        ProjectStatus::Completed => project.completed_at = Some(Utc::now()),
        ProjectStatus::InProgress | ProjectStatus::ClientReview => project.completed_at = None,
        _ => {}
    }
    let project = tx.update_project(&project).await?;

    let mut effects = vec![project_updated(&project, previous)];
    if next == ProjectStatus::Completed {
        effects.extend(project_completed(tx, &project).await?);
    }
    Ok((project, effects))
}
