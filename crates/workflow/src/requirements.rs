//! Versioned project requirements.

use agency_core::effects::{Effect, EntityKind, NotificationDraft, NotificationKind};
use agency_core::error::CoreError;
use agency_core::policy::{self, Action, Subject};
use agency_core::project;
use agency_core::requirement::{self, RequirementAction};
use agency_core::roles::Actor;
use agency_core::types::DbId;
use agency_db::models::requirement::{NewRequirement, Requirement};
use chrono::Utc;

use crate::access;
use crate::error::WorkflowResult;
use crate::load;
use crate::projects::apply_status;
use crate::Workflow;

fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::validation("Requirement content must not be empty"));
    }
    Ok(())
}

impl Workflow {
    /// Add the next requirement version. The first one moves a NEW project
    /// to REQUIREMENTS_PENDING.
    pub async fn create_requirement(
        &self,
        actor: &Actor,
        project_id: DbId,
        content: String,
    ) -> WorkflowResult<Requirement> {
        let mut tx = self.begin().await?;
        let project = load::locked_project(tx.as_mut(), project_id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Requirement(RequirementAction::Create),
        )?;
        project::ensure_editable(project.status)?;
        validate_content(&content)?;

        let latest = tx.latest_requirement_version(project_id).await?;
        let requirement = tx
            .insert_requirement(&NewRequirement {
                project_id,
                version: requirement::next_version(latest),
                content,
                created_by_id: actor.user_id,
            })
            .await?;

        let mut effects = Vec::new();
        if let Some(next) = project::after_requirement_created(project.status, latest.is_none()) {
            let (_, status_effects) = apply_status(tx.as_mut(), project, next).await?;
            effects.extend(status_effects);
        }
        self.commit(tx, effects).await?;

        tracing::info!(
            project_id,
            requirement_id = requirement.id,
            version = requirement.version,
            "Requirement created"
        );
        Ok(requirement)
    }

    /// Edit a DRAFT requirement in place.
    pub async fn update_requirement(
        &self,
        actor: &Actor,
        id: DbId,
        content: String,
    ) -> WorkflowResult<Requirement> {
        let mut tx = self.begin().await?;
        let (project, mut requirement) = load::requirement_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Requirement(RequirementAction::Update),
        )?;
        requirement::ensure_editable(requirement.status)?;
        validate_content(&content)?;

        requirement.content = content;
        let requirement = tx.update_requirement(&requirement).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(requirement_id = id, "Requirement updated");
        Ok(requirement)
    }

    pub async fn approve_requirement(&self, actor: &Actor, id: DbId) -> WorkflowResult<Requirement> {
        let mut tx = self.begin().await?;
        let (project, mut requirement) = load::requirement_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Requirement(RequirementAction::Approve),
        )?;

        requirement.status = requirement::next_status(requirement.status, RequirementAction::Approve)?;
        requirement.approved_by_id = Some(actor.user_id);
        requirement.approved_at = Some(Utc::now());
        let requirement = tx.update_requirement(&requirement).await?;

        let mut effects = Vec::new();
        if let Some(lead) = project.team_lead_id {
            effects.push(Effect::notify_user(
                lead,
                NotificationDraft::new(
                    NotificationKind::RequirementApproved,
                    "Requirements approved",
                    format!(
                        "Version {} of the requirements for \"{}\" was approved",
                        requirement.version, project.internal_name
                    ),
                )
                .about(EntityKind::Requirement, requirement.id),
            ));
        }
        if let Some(next) = project::after_requirement_approved(project.status) {
            let (_, status_effects) = apply_status(tx.as_mut(), project, next).await?;
            effects.extend(status_effects);
        }
        self.commit(tx, effects).await?;

        tracing::info!(requirement_id = id, "Requirement approved");
        Ok(requirement)
    }

    /// All versions of a project's requirements, oldest first.
    pub async fn list_requirements(
        &self,
        actor: &Actor,
        project_id: DbId,
    ) -> WorkflowResult<Vec<Requirement>> {
        let mut tx = self.begin().await?;
        let project = load::project(tx.as_mut(), project_id).await?;
        access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        let mut requirements = tx.list_requirements(project_id).await?;
        requirements.sort_by_key(|r| r.version);
        Ok(requirements)
    }
}
