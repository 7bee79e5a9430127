//! Design asset requests between team leads and the project designer.

use agency_core::asset::{self, AssetAction};
use agency_core::channels::{Channel, EventName};
use agency_core::effects::{Effect, EntityKind, NotificationDraft, NotificationKind};
use agency_core::error::CoreError;
use agency_core::policy::{self, Action, Subject};
use agency_core::project;
use agency_core::roles::Actor;
use agency_core::types::DbId;
use agency_db::models::asset::{DesignAsset, NewAsset, UpdateAsset};
use agency_db::models::project::Project;
use agency_db::models::task::TaskFilter;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::access;
use crate::error::WorkflowResult;
use crate::load;
use crate::Workflow;

#[derive(Debug, Clone, Deserialize)]
pub struct RequestAsset {
    pub title: String,
    pub description: Option<String>,
}

pub(crate) fn subject(project: &Project, asset: &DesignAsset) -> Subject {
    Subject::project(project.scope()).with_creator(Some(asset.requested_by_id))
}

fn asset_payload(asset: &DesignAsset) -> serde_json::Value {
    json!({
        "asset_id": asset.id,
        "project_id": asset.project_id,
        "title": asset.title,
        "status": asset.status,
        "file_url": asset.file_url,
    })
}

impl Workflow {
    /// Ask the project's designer for an asset. The project must already
    /// have a designer.
    pub async fn request_asset(
        &self,
        actor: &Actor,
        project_id: DbId,
        input: RequestAsset,
    ) -> WorkflowResult<DesignAsset> {
        let mut tx = self.begin().await?;
        let project = load::locked_project(tx.as_mut(), project_id).await?;
        policy::authorize(
            actor,
            &Subject::project(project.scope()),
            Action::Asset(AssetAction::Create),
        )?;
        project::ensure_editable(project.status)?;
        asset::ensure_designer_assigned(project.designer_id)?;
        if input.title.trim().is_empty() {
            return Err(CoreError::validation("Asset title must not be empty").into());
        }

        let asset = tx
            .insert_asset(&NewAsset {
                project_id,
                title: input.title,
                description: input.description,
                requested_by_id: actor.user_id,
            })
            .await?;

        let effects = project
            .designer_id
            .map(|designer| {
                Effect::notify_user(
                    designer,
                    NotificationDraft::new(
                        NotificationKind::AssetRequested,
                        "New design request",
                        format!("\"{}\" on project \"{}\"", asset.title, project.internal_name),
                    )
                    .about(EntityKind::DesignAsset, asset.id),
                )
            })
            .into_iter()
            .collect();
        self.commit(tx, effects).await?;

        tracing::info!(asset_id = asset.id, project_id, "Design asset requested");
        Ok(asset)
    }

    pub async fn list_assets(&self, actor: &Actor, project_id: DbId) -> WorkflowResult<Vec<DesignAsset>> {
        let mut tx = self.begin().await?;
        let project = load::project(tx.as_mut(), project_id).await?;
        access::ensure_can_view(tx.as_mut(), actor, &project).await?;
        Ok(tx.list_assets(project_id).await?)
    }

    pub async fn update_asset(
        &self,
        actor: &Actor,
        id: DbId,
        input: UpdateAsset,
    ) -> WorkflowResult<DesignAsset> {
        let mut tx = self.begin().await?;
        let (project, mut asset) = load::asset_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &asset), Action::Asset(AssetAction::Update))?;
        asset::ensure_mutable(asset.status)?;

        input.apply(&mut asset);
        let asset = tx.update_asset(&asset).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(asset_id = id, "Design asset updated");
        Ok(asset)
    }

    pub async fn delete_asset(&self, actor: &Actor, id: DbId) -> WorkflowResult<()> {
        let mut tx = self.begin().await?;
        let (project, asset) = load::asset_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &asset), Action::Asset(AssetAction::Delete))?;
        asset::ensure_mutable(asset.status)?;
        tx.delete_asset(id).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(asset_id = id, "Design asset deleted");
        Ok(())
    }

    pub async fn start_asset(&self, actor: &Actor, id: DbId) -> WorkflowResult<DesignAsset> {
        let mut tx = self.begin().await?;
        let (project, mut asset) = load::asset_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &asset), Action::Asset(AssetAction::Start))?;

        asset.status = asset::next_status(asset.status, AssetAction::Start)?;
        let asset = tx.update_asset(&asset).await?;
        self.commit(tx, Vec::new()).await?;

        tracing::info!(asset_id = id, "Design asset started");
        Ok(asset)
    }

    pub async fn submit_asset(
        &self,
        actor: &Actor,
        id: DbId,
        file_url: String,
    ) -> WorkflowResult<DesignAsset> {
        if file_url.trim().is_empty() {
            return Err(CoreError::validation("A file URL is required").into());
        }
        let mut tx = self.begin().await?;
        let (project, mut asset) = load::asset_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &asset), Action::Asset(AssetAction::Submit))?;

        asset.status = asset::next_status(asset.status, AssetAction::Submit)?;
        asset.file_url = Some(file_url);
        asset.uploaded_by_id = Some(actor.user_id);
        asset.submitted_at = Some(Utc::now());
        let asset = tx.update_asset(&asset).await?;

        let effects = vec![
            Effect::notify_user(
                asset.requested_by_id,
                NotificationDraft::new(
                    NotificationKind::AssetSubmitted,
                    "Design submitted",
                    format!("\"{}\" is ready for review", asset.title),
                )
                .about(EntityKind::DesignAsset, asset.id),
            ),
            Effect::publish(
                Channel::Project(asset.project_id),
                EventName::AssetSubmitted,
                asset_payload(&asset),
            ),
        ];
        self.commit(tx, effects).await?;

        tracing::info!(asset_id = id, "Design asset submitted");
        Ok(asset)
    }

    /// Approve a submitted asset and tell the designer plus every developer
    /// working on the project.
    pub async fn approve_asset(&self, actor: &Actor, id: DbId) -> WorkflowResult<DesignAsset> {
        let mut tx = self.begin().await?;
        let (project, mut asset) = load::asset_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &asset), Action::Asset(AssetAction::Approve))?;

        asset.status = asset::next_status(asset.status, AssetAction::Approve)?;
        asset.approved_by_id = Some(actor.user_id);
        asset.approved_at = Some(Utc::now());
        asset.rejection_reason = None;
        let asset = tx.update_asset(&asset).await?;

        let developers = tx
            .list_tasks(&TaskFilter::for_project(project.id))
            .await?
            .into_iter()
            .map(|t| t.assigned_to_id);

        let mut effects = Vec::new();
        if let Some(designer) = asset.uploaded_by_id.or(project.designer_id) {
            effects.push(Effect::notify_user(
                designer,
                NotificationDraft::new(
                    NotificationKind::AssetApproved,
                    "Design approved",
                    format!("\"{}\" was approved", asset.title),
                )
                .about(EntityKind::DesignAsset, asset.id),
            ));
        }
        effects.push(Effect::notify_users(
            developers,
            NotificationDraft::new(
                NotificationKind::AssetApproved,
                "New design available",
                format!("\"{}\" is approved for project \"{}\"", asset.title, project.internal_name),
            )
            .about(EntityKind::DesignAsset, asset.id),
        ));
        effects.push(Effect::publish(
            Channel::Project(asset.project_id),
            EventName::AssetApproved,
            asset_payload(&asset),
        ));
        self.commit(tx, effects).await?;

        tracing::info!(asset_id = id, "Design asset approved");
        Ok(asset)
    }

    pub async fn reject_asset(
        &self,
        actor: &Actor,
        id: DbId,
        reason: String,
    ) -> WorkflowResult<DesignAsset> {
        if reason.trim().is_empty() {
            return Err(CoreError::validation("A rejection reason is required").into());
        }
        let mut tx = self.begin().await?;
        let (project, mut asset) = load::asset_in_locked_project(tx.as_mut(), id).await?;
        policy::authorize(actor, &subject(&project, &asset), Action::Asset(AssetAction::Reject))?;

        asset.status = asset::next_status(asset.status, AssetAction::Reject)?;
        asset.rejection_reason = Some(reason);
        let asset = tx.update_asset(&asset).await?;

        let mut effects = Vec::new();
        if let Some(designer) = asset.uploaded_by_id.or(project.designer_id) {
            effects.push(Effect::notify_user(
                designer,
                NotificationDraft::new(
                    NotificationKind::AssetRejected,
                    "Design needs changes",
                    format!("\"{}\" was sent back", asset.title),
                )
                .about(EntityKind::DesignAsset, asset.id),
            ));
        }
        self.commit(tx, effects).await?;

        tracing::info!(asset_id = id, "Design asset rejected");
        Ok(asset)
    }
}
