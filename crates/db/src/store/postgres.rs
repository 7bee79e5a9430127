//! PostgreSQL entity store over the repository layer.

use std::collections::HashMap;

use agency_core::tier::TierStats;
use agency_core::types::DbId;
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::{EntityStore, StoreResult, StoreTx};
use crate::error::StoreError;
use crate::models::asset::{DesignAsset, NewAsset};
use crate::models::fiverr_account::{FiverrAccount, NewFiverrAccount};
use crate::models::notification::{NewNotification, Notification, NotificationQuery};
use crate::models::project::{NewProject, Project, ProjectFilter};
use crate::models::requirement::{NewRequirement, Requirement};
use crate::models::review::{NewReview, ProjectReview, ReviewFilter};
use crate::models::revision::{NewRevision, Revision, RevisionFilter};
use crate::models::task::{NewTask, Task, TaskFilter};
use crate::models::user::{NewUser, User, UserFilter};
use crate::repositories::{
    AssetRepo, FiverrAccountRepo, NotificationRepo, ProjectRepo, RequirementRepo, ReviewRepo,
    RevisionRepo, TaskRepo, UserRepo,
};
use crate::DbPool;

/// [`EntityStore`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

fn found<T>(row: Option<T>, entity: &'static str, id: DbId) -> StoreResult<T> {
    row.ok_or(StoreError::Missing { entity, id })
}

#[async_trait]
impl StoreTx for PgTx {
    async fn get_user(&mut self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_users(&mut self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        Ok(UserRepo::list(&mut self.tx, filter).await?)
    }

    async fn insert_user(&mut self, input: &NewUser) -> StoreResult<User> {
        Ok(UserRepo::create(&mut self.tx, input).await?)
    }

    async fn update_user_tier(&mut self, id: DbId, stats: &TierStats) -> StoreResult<User> {
        found(UserRepo::update_tier(&mut self.tx, id, stats).await?, "User", id)
    }

    async fn get_fiverr_account(&mut self, id: DbId) -> StoreResult<Option<FiverrAccount>> {
        Ok(FiverrAccountRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_fiverr_accounts(&mut self) -> StoreResult<Vec<FiverrAccount>> {
        Ok(FiverrAccountRepo::list(&mut self.tx).await?)
    }

    async fn insert_fiverr_account(
        &mut self,
        input: &NewFiverrAccount,
    ) -> StoreResult<FiverrAccount> {
        Ok(FiverrAccountRepo::create(&mut self.tx, input).await?)
    }

    async fn get_project(&mut self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(ProjectRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn lock_project(&mut self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(ProjectRepo::find_for_update(&mut self.tx, id).await?)
    }

    async fn list_projects(&mut self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        Ok(ProjectRepo::list(&mut self.tx, filter).await?)
    }

    async fn insert_project(&mut self, input: &NewProject) -> StoreResult<Project> {
        Ok(ProjectRepo::create(&mut self.tx, input).await?)
    }

    async fn update_project(&mut self, project: &Project) -> StoreResult<Project> {
        found(
            ProjectRepo::update(&mut self.tx, project).await?,
            "Project",
            project.id,
        )
    }

    async fn delete_project(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(ProjectRepo::delete(&mut self.tx, id).await?)
    }

    async fn get_task(&mut self, id: DbId) -> StoreResult<Option<Task>> {
        Ok(TaskRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_tasks(&mut self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(TaskRepo::list(&mut self.tx, filter).await?)
    }

    async fn insert_task(&mut self, input: &NewTask) -> StoreResult<Task> {
        Ok(TaskRepo::create(&mut self.tx, input).await?)
    }

    async fn update_task(&mut self, task: &Task) -> StoreResult<Task> {
        found(TaskRepo::update(&mut self.tx, task).await?, "Task", task.id)
    }

    async fn delete_task(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(TaskRepo::delete(&mut self.tx, id).await?)
    }

    async fn active_task_counts(&mut self) -> StoreResult<HashMap<DbId, i64>> {
        Ok(TaskRepo::active_counts(&mut self.tx).await?)
    }

    async fn get_asset(&mut self, id: DbId) -> StoreResult<Option<DesignAsset>> {
        Ok(AssetRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_assets(&mut self, project_id: DbId) -> StoreResult<Vec<DesignAsset>> {
        Ok(AssetRepo::list_by_project(&mut self.tx, project_id).await?)
    }

    async fn insert_asset(&mut self, input: &NewAsset) -> StoreResult<DesignAsset> {
        Ok(AssetRepo::create(&mut self.tx, input).await?)
    }

    async fn update_asset(&mut self, asset: &DesignAsset) -> StoreResult<DesignAsset> {
        found(
            AssetRepo::update(&mut self.tx, asset).await?,
            "DesignAsset",
            asset.id,
        )
    }

    async fn delete_asset(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(AssetRepo::delete(&mut self.tx, id).await?)
    }

    async fn get_revision(&mut self, id: DbId) -> StoreResult<Option<Revision>> {
        Ok(RevisionRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_revisions(&mut self, filter: &RevisionFilter) -> StoreResult<Vec<Revision>> {
        Ok(RevisionRepo::list(&mut self.tx, filter).await?)
    }

    async fn insert_revision(&mut self, input: &NewRevision) -> StoreResult<Revision> {
        Ok(RevisionRepo::create(&mut self.tx, input).await?)
    }

    async fn update_revision(&mut self, revision: &Revision) -> StoreResult<Revision> {
        found(
            RevisionRepo::update(&mut self.tx, revision).await?,
            "Revision",
            revision.id,
        )
    }

    async fn delete_revision(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(RevisionRepo::delete(&mut self.tx, id).await?)
    }

    async fn get_requirement(&mut self, id: DbId) -> StoreResult<Option<Requirement>> {
        Ok(RequirementRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_requirements(&mut self, project_id: DbId) -> StoreResult<Vec<Requirement>> {
        Ok(RequirementRepo::list_by_project(&mut self.tx, project_id).await?)
    }

    async fn latest_requirement_version(&mut self, project_id: DbId) -> StoreResult<Option<i32>> {
        Ok(RequirementRepo::latest_version(&mut self.tx, project_id).await?)
    }

    async fn insert_requirement(&mut self, input: &NewRequirement) -> StoreResult<Requirement> {
        Ok(RequirementRepo::create(&mut self.tx, input).await?)
    }

    async fn update_requirement(&mut self, requirement: &Requirement) -> StoreResult<Requirement> {
        found(
            RequirementRepo::update(&mut self.tx, requirement).await?,
            "Requirement",
            requirement.id,
        )
    }

    async fn get_review(&mut self, id: DbId) -> StoreResult<Option<ProjectReview>> {
        Ok(ReviewRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn list_reviews(&mut self, filter: &ReviewFilter) -> StoreResult<Vec<ProjectReview>> {
        Ok(ReviewRepo::list(&mut self.tx, filter).await?)
    }

    async fn insert_review(&mut self, input: &NewReview) -> StoreResult<ProjectReview> {
        Ok(ReviewRepo::create(&mut self.tx, input).await?)
    }

    async fn update_review(&mut self, review: &ProjectReview) -> StoreResult<ProjectReview> {
        found(
            ReviewRepo::update(&mut self.tx, review).await?,
            "ProjectReview",
            review.id,
        )
    }

    async fn delete_review(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(ReviewRepo::delete(&mut self.tx, id).await?)
    }

    async fn insert_notification(&mut self, input: &NewNotification) -> StoreResult<Notification> {
        Ok(NotificationRepo::create(&mut self.tx, input).await?)
    }

    async fn list_notifications(
        &mut self,
        user_id: DbId,
        query: &NotificationQuery,
    ) -> StoreResult<Vec<Notification>> {
        Ok(NotificationRepo::list_for_user(&mut self.tx, user_id, query).await?)
    }

    async fn unread_count(&mut self, user_id: DbId) -> StoreResult<i64> {
        Ok(NotificationRepo::unread_count(&mut self.tx, user_id).await?)
    }

    async fn mark_notification_read(&mut self, id: DbId, user_id: DbId) -> StoreResult<bool> {
        Ok(NotificationRepo::mark_read(&mut self.tx, id, user_id).await?)
    }

    async fn mark_all_notifications_read(&mut self, user_id: DbId) -> StoreResult<u64> {
        Ok(NotificationRepo::mark_all_read(&mut self.tx, user_id).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
