//! Permission hints: the policy table dry-run for one entity.

use agency_core::effects::EntityKind;
use agency_core::policy::{self, PermissionHint, Subject};
use agency_core::roles::Actor;
use agency_core::types::DbId;

use crate::access;
use crate::error::WorkflowResult;
use crate::{assets, load, revisions, tasks, Workflow};

impl Workflow {
    /// Allow/deny with reason for every action defined on `kind`, evaluated
    /// against the entity `id` as it is stored now. Nothing is written.
    pub async fn permission_hints(
        &self,
        actor: &Actor,
        kind: EntityKind,
        id: DbId,
    ) -> WorkflowResult<Vec<PermissionHint>> {
        let mut tx = self.begin().await?;
        let (project, subject) = match kind {
            EntityKind::Project => {
                let project = load::project(tx.as_mut(), id).await?;
                let subject = Subject::project(project.scope());
                (project, subject)
            }
            EntityKind::Task => {
                let task = load::task(tx.as_mut(), id).await?;
                let project = load::project(tx.as_mut(), task.project_id).await?;
                let subject = tasks::subject(&project, &task);
                (project, subject)
            }
            EntityKind::DesignAsset => {
                let asset = load::asset(tx.as_mut(), id).await?;
                let project = load::project(tx.as_mut(), asset.project_id).await?;
                let subject = assets::subject(&project, &asset);
                (project, subject)
            }
            EntityKind::Revision => {
                let revision = load::revision(tx.as_mut(), id).await?;
                let project = load::project(tx.as_mut(), revision.project_id).await?;
                let subject = revisions::subject(&project, &revision);
                (project, subject)
            }
            EntityKind::Requirement => {
                let requirement = load::requirement(tx.as_mut(), id).await?;
                let project = load::project(tx.as_mut(), requirement.project_id).await?;
                let subject = Subject::project(project.scope());
                (project, subject)
            }
            EntityKind::ProjectReview => {
                let review = load::review(tx.as_mut(), id).await?;
                let project = load::project(tx.as_mut(), review.project_id).await?;
                let subject = Subject::project(project.scope());
                (project, subject)
            }
        };
        access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        Ok(policy::hints(actor, &subject, kind))
    }
}
