//! Loaders shared by the operation modules.
//!
//! Transitions lock the owning project first, then re-read the child row,
//! so every read that feeds a decision happens under the project lock.

use agency_core::error::CoreError;
use agency_core::roles::Role;
use agency_core::types::DbId;
use agency_db::models::asset::DesignAsset;
use agency_db::models::project::Project;
use agency_db::models::requirement::Requirement;
use agency_db::models::review::ProjectReview;
use agency_db::models::revision::Revision;
use agency_db::models::task::Task;
use agency_db::models::user::User;
use agency_db::StoreTx;

use crate::error::WorkflowResult;

fn missing(entity: &'static str, id: DbId) -> CoreError {
    CoreError::NotFound { entity, id }
}

pub(crate) async fn project(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<Project> {
    Ok(tx.get_project(id).await?.ok_or(missing("Project", id))?)
}

pub(crate) async fn locked_project(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<Project> {
    Ok(tx.lock_project(id).await?.ok_or(missing("Project", id))?)
}

pub(crate) async fn user(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<User> {
    Ok(tx.get_user(id).await?.ok_or(missing("User", id))?)
}

/// Load a user who is about to receive work: must exist, hold `role`,
/// and be ACTIVE.
pub(crate) async fn active_user_with_role(
    tx: &mut dyn StoreTx,
    id: DbId,
    role: Role,
) -> WorkflowResult<User> {
    let user = user(tx, id).await?;
    if user.role != role {
        return Err(CoreError::validation(format!("User {id} is not a {role}")).into());
    }
    if !user.is_active() {
        return Err(CoreError::validation(format!("User {id} is not active")).into());
    }
    Ok(user)
}

pub(crate) async fn task(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<Task> {
    Ok(tx.get_task(id).await?.ok_or(missing("Task", id))?)
}

pub(crate) async fn task_in_locked_project(
    tx: &mut dyn StoreTx,
    id: DbId,
) -> WorkflowResult<(Project, Task)> {
    let project_id = task(tx, id).await?.project_id;
    let project = locked_project(tx, project_id).await?;
    let task = task(tx, id).await?;
    Ok((project, task))
}

pub(crate) async fn asset(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<DesignAsset> {
    Ok(tx.get_asset(id).await?.ok_or(missing("DesignAsset", id))?)
}

pub(crate) async fn asset_in_locked_project(
    tx: &mut dyn StoreTx,
    id: DbId,
) -> WorkflowResult<(Project, DesignAsset)> {
    let project_id = asset(tx, id).await?.project_id;
    let project = locked_project(tx, project_id).await?;
    let asset = asset(tx, id).await?;
    Ok((project, asset))
}

pub(crate) async fn revision(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<Revision> {
    Ok(tx.get_revision(id).await?.ok_or(missing("Revision", id))?)
}

pub(crate) async fn revision_in_locked_project(
    tx: &mut dyn StoreTx,
    id: DbId,
) -> WorkflowResult<(Project, Revision)> {
    let project_id = revision(tx, id).await?.project_id;
    let project = locked_project(tx, project_id).await?;
    let revision = revision(tx, id).await?;
    Ok((project, revision))
}

pub(crate) async fn requirement(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<Requirement> {
    Ok(tx.get_requirement(id).await?.ok_or(missing("Requirement", id))?)
}

pub(crate) async fn requirement_in_locked_project(
    tx: &mut dyn StoreTx,
    id: DbId,
) -> WorkflowResult<(Project, Requirement)> {
    let project_id = requirement(tx, id).await?.project_id;
    let project = locked_project(tx, project_id).await?;
    let requirement = requirement(tx, id).await?;
    Ok((project, requirement))
}

pub(crate) async fn review(tx: &mut dyn StoreTx, id: DbId) -> WorkflowResult<ProjectReview> {
    Ok(tx.get_review(id).await?.ok_or(missing("ProjectReview", id))?)
}

pub(crate) async fn review_in_locked_project(
    tx: &mut dyn StoreTx,
    id: DbId,
) -> WorkflowResult<(Project, ProjectReview)> {
    let project_id = review(tx, id).await?.project_id;
    let project = locked_project(tx, project_id).await?;
    let review = review(tx, id).await?;
    Ok((project, review))
}
