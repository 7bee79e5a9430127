//! In-memory entity store for development and testing.
//!
//! All tables live behind one async mutex. A transaction holds the lock
//! for its whole lifetime and works on a private copy of the tables;
//! `commit` swaps the copy in, dropping discards it. This serializes every
//! transaction, which is stricter than PostgreSQL's row locks but gives
//! the same guarantees to callers. Not suitable for production use.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex};

use agency_core::asset::AssetStatus;
use agency_core::project::ProjectStatus;
use agency_core::requirement::RequirementStatus;
use agency_core::revision::RevisionStatus;
use agency_core::task::TaskStatus;
use agency_core::tier::{Tier, TierStats};
use agency_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

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

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: DbId,
    users: BTreeMap<DbId, User>,
    accounts: BTreeMap<DbId, FiverrAccount>,
    projects: BTreeMap<DbId, Project>,
    tasks: BTreeMap<DbId, Task>,
    assets: BTreeMap<DbId, DesignAsset>,
    revisions: BTreeMap<DbId, Revision>,
    requirements: BTreeMap<DbId, Requirement>,
    reviews: BTreeMap<DbId, ProjectReview>,
    notifications: BTreeMap<DbId, Notification>,
}

impl Tables {
    /// Ids are shared across tables, like a single sequence.
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }
}

type Clock = Arc<StdMutex<Option<Timestamp>>>;

/// In-memory [`EntityStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: Clock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the timestamp stamped on subsequent writes.
    pub fn set_clock(&self, at: Timestamp) {
        if let Ok(mut clock) = self.clock.lock() {
            *clock = Some(at);
        }
    }

    /// Return to wall-clock timestamps.
    pub fn clear_clock(&self) {
        if let Ok(mut clock) = self.clock.lock() {
            *clock = None;
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            work,
            clock: Arc::clone(&self.clock),
        }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
    clock: Clock,
}

impl MemoryTx {
    fn now(&self) -> Timestamp {
        self.clock
            .lock()
            .ok()
            .and_then(|c| *c)
            .unwrap_or_else(Utc::now)
    }
}

fn replace<T: Clone>(
    table: &mut BTreeMap<DbId, T>,
    entity: &'static str,
    id: DbId,
    row: T,
) -> StoreResult<T> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = row.clone();
            Ok(row)
        }
        None => Err(StoreError::Missing { entity, id }),
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    // --- users ---

    async fn get_user(&mut self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn list_users(&mut self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        Ok(self
            .work
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect())
    }

    async fn insert_user(&mut self, input: &NewUser) -> StoreResult<User> {
        if self.work.users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Unique("uq_users_email".into()));
        }
        let now = self.now();
        let id = self.work.next_id();
        let user = User {
            id,
            email: input.email.clone(),
            name: input.name.clone(),
            role: input.role,
            status: input.status,
            tier: Tier::Trainee,
            completed_projects: 0,
            average_rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        self.work.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user_tier(&mut self, id: DbId, stats: &TierStats) -> StoreResult<User> {
        let now = self.now();
        let user = self
            .work
            .users
            .get_mut(&id)
            .ok_or(StoreError::Missing { entity: "User", id })?;
        user.tier = stats.tier;
        user.completed_projects = stats.completed_projects;
        user.average_rating = stats.average_rating;
        user.total_reviews = stats.total_reviews;
        user.updated_at = now;
        Ok(user.clone())
    }

    // --- fiverr accounts ---

    async fn get_fiverr_account(&mut self, id: DbId) -> StoreResult<Option<FiverrAccount>> {
        Ok(self.work.accounts.get(&id).cloned())
    }

    async fn list_fiverr_accounts(&mut self) -> StoreResult<Vec<FiverrAccount>> {
        Ok(self.work.accounts.values().cloned().collect())
    }

    async fn insert_fiverr_account(
        &mut self,
        input: &NewFiverrAccount,
    ) -> StoreResult<FiverrAccount> {
        if self.work.accounts.values().any(|a| a.name == input.name) {
            return Err(StoreError::Unique("uq_fiverr_accounts_name".into()));
        }
        let now = self.now();
        let id = self.work.next_id();
        let account = FiverrAccount {
            id,
            name: input.name.clone(),
            is_active: true,
            created_at: now,
        };
        self.work.accounts.insert(id, account.clone());
        Ok(account)
    }

    // --- projects ---

    async fn get_project(&mut self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(self.work.projects.get(&id).cloned())
    }

    async fn lock_project(&mut self, id: DbId) -> StoreResult<Option<Project>> {
        // The whole store is already locked by this transaction.
        self.get_project(id).await
    }

    async fn list_projects(&mut self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        Ok(self
            .work
            .projects
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn insert_project(&mut self, input: &NewProject) -> StoreResult<Project> {
        let now = self.now();
        let id = self.work.next_id();
        let project = Project {
            id,
            internal_name: input.internal_name.clone(),
            client_name: input.client_name.clone(),
            fiverr_account_id: input.fiverr_account_id,
            fiverr_order_id: input.fiverr_order_id.clone(),
            status: ProjectStatus::New,
            priority: input.priority,
            complexity: input.complexity,
            manager_id: input.manager_id,
            team_lead_id: None,
            designer_id: None,
            budget_cents: input.budget_cents,
            deadline: input.deadline,
            internal_deadline: input.internal_deadline,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.work.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn update_project(&mut self, project: &Project) -> StoreResult<Project> {
        let mut row = project.clone();
        row.updated_at = self.now();
        replace(&mut self.work.projects, "Project", project.id, row)
    }

    async fn delete_project(&mut self, id: DbId) -> StoreResult<bool> {
        let t = &mut self.work;
        if t.projects.remove(&id).is_none() {
            return Ok(false);
        }
        t.tasks.retain(|_, r| r.project_id != id);
        t.requirements.retain(|_, r| r.project_id != id);
        t.assets.retain(|_, r| r.project_id != id);
        t.revisions.retain(|_, r| r.project_id != id);
        t.reviews.retain(|_, r| r.project_id != id);
        Ok(true)
    }

    // --- tasks ---

    async fn get_task(&mut self, id: DbId) -> StoreResult<Option<Task>> {
        Ok(self.work.tasks.get(&id).cloned())
    }

    async fn list_tasks(&mut self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(self
            .work
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn insert_task(&mut self, input: &NewTask) -> StoreResult<Task> {
        let now = self.now();
        let id = self.work.next_id();
        let task = Task {
            id,
            project_id: input.project_id,
            title: input.title.clone(),
            description: input.description.clone(),
            assigned_to_id: input.assigned_to_id,
            assigned_by_id: input.assigned_by_id,
            status: TaskStatus::Assigned,
            priority: input.priority,
            due_date: input.due_date,
            submission_notes: None,
            submission_url: None,
            rejection_reason: None,
            submitted_at: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.work.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&mut self, task: &Task) -> StoreResult<Task> {
        let mut row = task.clone();
        row.updated_at = self.now();
        replace(&mut self.work.tasks, "Task", task.id, row)
    }

    async fn delete_task(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.work.tasks.remove(&id).is_some())
    }

    async fn active_task_counts(&mut self) -> StoreResult<HashMap<DbId, i64>> {
        let mut counts = HashMap::new();
        for task in self.work.tasks.values().filter(|t| t.status.is_active()) {
            *counts.entry(task.assigned_to_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    // --- design assets ---

    async fn get_asset(&mut self, id: DbId) -> StoreResult<Option<DesignAsset>> {
        Ok(self.work.assets.get(&id).cloned())
    }

    async fn list_assets(&mut self, project_id: DbId) -> StoreResult<Vec<DesignAsset>> {
        Ok(self
            .work
            .assets
            .values()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_asset(&mut self, input: &NewAsset) -> StoreResult<DesignAsset> {
        let now = self.now();
        let id = self.work.next_id();
        let asset = DesignAsset {
            id,
            project_id: input.project_id,
            title: input.title.clone(),
            description: input.description.clone(),
            requested_by_id: input.requested_by_id,
            uploaded_by_id: None,
            approved_by_id: None,
            status: AssetStatus::Requested,
            file_url: None,
            rejection_reason: None,
            submitted_at: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.work.assets.insert(id, asset.clone());
        Ok(asset)
    }

    async fn update_asset(&mut self, asset: &DesignAsset) -> StoreResult<DesignAsset> {
        let mut row = asset.clone();
        row.updated_at = self.now();
        replace(&mut self.work.assets, "DesignAsset", asset.id, row)
    }

    async fn delete_asset(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.work.assets.remove(&id).is_some())
    }

    // --- revisions ---

    async fn get_revision(&mut self, id: DbId) -> StoreResult<Option<Revision>> {
        Ok(self.work.revisions.get(&id).cloned())
    }

    async fn list_revisions(&mut self, filter: &RevisionFilter) -> StoreResult<Vec<Revision>> {
        Ok(self
            .work
            .revisions
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn insert_revision(&mut self, input: &NewRevision) -> StoreResult<Revision> {
        let now = self.now();
        let id = self.work.next_id();
        let revision = Revision {
            id,
            project_id: input.project_id,
            created_by_id: input.created_by_id,
            assigned_team_lead_id: input.assigned_team_lead_id,
            assigned_developer_id: None,
            status: RevisionStatus::Pending,
            description: input.description.clone(),
            developer_message: None,
            manager_accepted: false,
            is_paid: input.is_paid,
            submitted_at: None,
            completed_at: None,
            accepted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.work.revisions.insert(id, revision.clone());
        Ok(revision)
    }

    async fn update_revision(&mut self, revision: &Revision) -> StoreResult<Revision> {
        let mut row = revision.clone();
        row.updated_at = self.now();
        replace(&mut self.work.revisions, "Revision", revision.id, row)
    }

    async fn delete_revision(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.work.revisions.remove(&id).is_some())
    }

    // --- requirements ---

    async fn get_requirement(&mut self, id: DbId) -> StoreResult<Option<Requirement>> {
        Ok(self.work.requirements.get(&id).cloned())
    }

    async fn list_requirements(&mut self, project_id: DbId) -> StoreResult<Vec<Requirement>> {
        let mut rows: Vec<Requirement> = self
            .work
            .requirements
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.version);
        Ok(rows)
    }

    async fn latest_requirement_version(&mut self, project_id: DbId) -> StoreResult<Option<i32>> {
        Ok(self
            .work
            .requirements
            .values()
            .filter(|r| r.project_id == project_id)
            .map(|r| r.version)
            .max())
    }

    async fn insert_requirement(&mut self, input: &NewRequirement) -> StoreResult<Requirement> {
        if self
            .work
            .requirements
            .values()
            .any(|r| r.project_id == input.project_id && r.version == input.version)
        {
            return Err(StoreError::Unique("uq_requirements_project_version".into()));
        }
        let now = self.now();
        let id = self.work.next_id();
        let requirement = Requirement {
            id,
            project_id: input.project_id,
            version: input.version,
            status: RequirementStatus::Draft,
            content: input.content.clone(),
            created_by_id: input.created_by_id,
            approved_by_id: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.work.requirements.insert(id, requirement.clone());
        Ok(requirement)
    }

    async fn update_requirement(&mut self, requirement: &Requirement) -> StoreResult<Requirement> {
        let mut row = requirement.clone();
        row.updated_at = self.now();
        replace(&mut self.work.requirements, "Requirement", requirement.id, row)
    }

    // --- project reviews ---

    async fn get_review(&mut self, id: DbId) -> StoreResult<Option<ProjectReview>> {
        Ok(self.work.reviews.get(&id).cloned())
    }

    async fn list_reviews(&mut self, filter: &ReviewFilter) -> StoreResult<Vec<ProjectReview>> {
        Ok(self
            .work
            .reviews
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn insert_review(&mut self, input: &NewReview) -> StoreResult<ProjectReview> {
        if self
            .work
            .reviews
            .values()
            .any(|r| r.project_id == input.project_id && r.developer_id == input.developer_id)
        {
            return Err(StoreError::Unique("uq_project_reviews_project_developer".into()));
        }
        let now = self.now();
        let id = self.work.next_id();
        let review = ProjectReview {
            id,
            project_id: input.project_id,
            developer_id: input.developer_id,
            reviewer_id: input.reviewer_id,
            rating: input.rating,
            communication: input.communication,
            quality: input.quality,
            timeliness: input.timeliness,
            professionalism: input.professionalism,
            comment: input.comment.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn update_review(&mut self, review: &ProjectReview) -> StoreResult<ProjectReview> {
        let mut row = review.clone();
        row.updated_at = self.now();
        replace(&mut self.work.reviews, "ProjectReview", review.id, row)
    }

    async fn delete_review(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.work.reviews.remove(&id).is_some())
    }

    // --- notifications ---

    async fn insert_notification(&mut self, input: &NewNotification) -> StoreResult<Notification> {
        if !self.work.users.contains_key(&input.user_id) {
            return Err(StoreError::Missing {
                entity: "User",
                id: input.user_id,
            });
        }
        let now = self.now();
        let id = self.work.next_id();
        let notification = Notification {
            id,
            user_id: input.user_id,
            notification_type: input.kind,
            title: input.title.clone(),
            message: input.message.clone(),
            reference_type: input.reference_type().map(str::to_string),
            reference_id: input.reference_id(),
            is_read: false,
            read_at: None,
            created_at: now,
        };
        self.work.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &mut self,
        user_id: DbId,
        query: &NotificationQuery,
    ) -> StoreResult<Vec<Notification>> {
        let mut rows: Vec<Notification> = self
            .work
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && (!query.unread_only || !n.is_read))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn unread_count(&mut self, user_id: DbId) -> StoreResult<i64> {
        Ok(self
            .work
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_notification_read(&mut self, id: DbId, user_id: DbId) -> StoreResult<bool> {
        let now = self.now();
        match self.work.notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id && !n.is_read => {
                n.is_read = true;
                n.read_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&mut self, user_id: DbId) -> StoreResult<u64> {
        let now = self.now();
        let mut changed = 0;
        for n in self
            .work
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            n.read_at = Some(now);
            changed += 1;
        }
        Ok(changed)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx {
            mut guard, work, ..
        } = *self;
        *guard = work;
        Ok(())
    }
}
