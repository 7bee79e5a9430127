//! Transactional entity store.
//!
//! The workflow layer never talks to a database directly. It opens a
//! [`StoreTx`] through an [`EntityStore`], performs every read and write
//! of one transition inside it, then commits. Dropping a transaction
//! without committing discards all of its writes.
//!
//! Two implementations exist: [`MemoryStore`] for development and tests,
//! and [`PgStore`] backed by the repositories in [`crate::repositories`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::collections::HashMap;

use agency_core::tier::TierStats;
use agency_core::types::DbId;
use async_trait::async_trait;

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

pub type StoreResult<T> = Result<T, StoreError>;

/// Entry point: hands out transactions.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

/// One open store transaction.
///
/// `update_*` methods write every mutable column of the given row and
/// return the stored version (with a refreshed `updated_at`); they fail
/// with [`StoreError::Missing`] when the row is gone. `delete_*` methods
/// return whether a row was removed.
#[async_trait]
pub trait StoreTx: Send {
    // --- users ---
    async fn get_user(&mut self, id: DbId) -> StoreResult<Option<User>>;
    async fn list_users(&mut self, filter: &UserFilter) -> StoreResult<Vec<User>>;
    async fn insert_user(&mut self, input: &NewUser) -> StoreResult<User>;
    async fn update_user_tier(&mut self, id: DbId, stats: &TierStats) -> StoreResult<User>;

    // --- fiverr accounts ---
    async fn get_fiverr_account(&mut self, id: DbId) -> StoreResult<Option<FiverrAccount>>;
    async fn list_fiverr_accounts(&mut self) -> StoreResult<Vec<FiverrAccount>>;
    async fn insert_fiverr_account(&mut self, input: &NewFiverrAccount)
        -> StoreResult<FiverrAccount>;

    // --- projects ---
    async fn get_project(&mut self, id: DbId) -> StoreResult<Option<Project>>;
    /// Like `get_project`, but holds the row until commit so transitions
    /// on the same project run one at a time.
    async fn lock_project(&mut self, id: DbId) -> StoreResult<Option<Project>>;
    async fn list_projects(&mut self, filter: &ProjectFilter) -> StoreResult<Vec<Project>>;
    async fn insert_project(&mut self, input: &NewProject) -> StoreResult<Project>;
    async fn update_project(&mut self, project: &Project) -> StoreResult<Project>;
    /// Removes the project with its tasks, requirements, assets, revisions
    /// and reviews.
    async fn delete_project(&mut self, id: DbId) -> StoreResult<bool>;

    // --- tasks ---
    async fn get_task(&mut self, id: DbId) -> StoreResult<Option<Task>>;
    async fn list_tasks(&mut self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;
    async fn insert_task(&mut self, input: &NewTask) -> StoreResult<Task>;
    async fn update_task(&mut self, task: &Task) -> StoreResult<Task>;
    async fn delete_task(&mut self, id: DbId) -> StoreResult<bool>;
    /// ASSIGNED + IN_PROGRESS task counts per developer, across all projects.
    async fn active_task_counts(&mut self) -> StoreResult<HashMap<DbId, i64>>;

    // --- design assets ---
    async fn get_asset(&mut self, id: DbId) -> StoreResult<Option<DesignAsset>>;
    async fn list_assets(&mut self, project_id: DbId) -> StoreResult<Vec<DesignAsset>>;
    async fn insert_asset(&mut self, input: &NewAsset) -> StoreResult<DesignAsset>;
    async fn update_asset(&mut self, asset: &DesignAsset) -> StoreResult<DesignAsset>;
    async fn delete_asset(&mut self, id: DbId) -> StoreResult<bool>;

    // --- revisions ---
    async fn get_revision(&mut self, id: DbId) -> StoreResult<Option<Revision>>;
    async fn list_revisions(&mut self, filter: &RevisionFilter) -> StoreResult<Vec<Revision>>;
    async fn insert_revision(&mut self, input: &NewRevision) -> StoreResult<Revision>;
    async fn update_revision(&mut self, revision: &Revision) -> StoreResult<Revision>;
    async fn delete_revision(&mut self, id: DbId) -> StoreResult<bool>;

    // --- requirements ---
    async fn get_requirement(&mut self, id: DbId) -> StoreResult<Option<Requirement>>;
    async fn list_requirements(&mut self, project_id: DbId) -> StoreResult<Vec<Requirement>>;
    async fn latest_requirement_version(&mut self, project_id: DbId) -> StoreResult<Option<i32>>;
    async fn insert_requirement(&mut self, input: &NewRequirement) -> StoreResult<Requirement>;
    async fn update_requirement(&mut self, requirement: &Requirement)
        -> StoreResult<Requirement>;

    // --- project reviews ---
    async fn get_review(&mut self, id: DbId) -> StoreResult<Option<ProjectReview>>;
    async fn list_reviews(&mut self, filter: &ReviewFilter) -> StoreResult<Vec<ProjectReview>>;
    async fn insert_review(&mut self, input: &NewReview) -> StoreResult<ProjectReview>;
    async fn update_review(&mut self, review: &ProjectReview) -> StoreResult<ProjectReview>;
    async fn delete_review(&mut self, id: DbId) -> StoreResult<bool>;

    // --- notifications ---
    async fn insert_notification(&mut self, input: &NewNotification)
        -> StoreResult<Notification>;
    async fn list_notifications(
        &mut self,
        user_id: DbId,
        query: &NotificationQuery,
    ) -> StoreResult<Vec<Notification>>;
    async fn unread_count(&mut self, user_id: DbId) -> StoreResult<i64>;
    /// Returns `false` when the notification is unknown, belongs to another
    /// user, or was already read.
    async fn mark_notification_read(&mut self, id: DbId, user_id: DbId) -> StoreResult<bool>;
    async fn mark_all_notifications_read(&mut self, user_id: DbId) -> StoreResult<u64>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
