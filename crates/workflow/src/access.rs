//! Read visibility.
//!
//! Transitions are gated by the policy table; reads are gated here. ADMIN
//! sees everything. Managers, team leads and designers see the projects
//! that name them. Developers see projects where they hold a task or an
//! assigned revision.

use agency_core::error::CoreError;
use agency_core::roles::{Actor, Role};
use agency_db::models::project::Project;
use agency_db::models::revision::RevisionFilter;
use agency_db::models::task::TaskFilter;
use agency_db::StoreTx;

use crate::error::WorkflowResult;

/// Whether the actor is named on the project row itself.
pub fn is_named_on(actor: &Actor, project: &Project) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => project.manager_id == actor.user_id,
        Role::TeamLead => project.team_lead_id == Some(actor.user_id),
        Role::Designer => project.designer_id == Some(actor.user_id),
        Role::Developer => false,
    }
}

pub(crate) async fn can_view(
    tx: &mut dyn StoreTx,
    actor: &Actor,
    project: &Project,
) -> WorkflowResult<bool> {
    if is_named_on(actor, project) {
        return Ok(true);
    }
    if actor.role != Role::Developer {
        return Ok(false);
    }

    let tasks = tx
        .list_tasks(&TaskFilter {
            project_id: Some(project.id),
            assigned_to_id: Some(actor.user_id),
            ..TaskFilter::default()
        })
        .await?;
    if !tasks.is_empty() {
        return Ok(true);
    }

    let revisions = tx
        .list_revisions(&RevisionFilter {
            project_id: Some(project.id),
            assigned_developer_id: Some(actor.user_id),
            ..RevisionFilter::default()
        })
        .await?;
    Ok(!revisions.is_empty())
}

pub(crate) async fn ensure_can_view(
    tx: &mut dyn StoreTx,
    actor: &Actor,
    project: &Project,
) -> WorkflowResult<()> {
    if can_view(tx, actor, project).await? {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!("You do not have access to project {}", project.id)).into())
    }
}
