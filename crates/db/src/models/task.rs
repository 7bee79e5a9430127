//! Developer task models.

use agency_core::task::TaskStatus;
use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: DbId,
    pub assigned_by_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub priority: i16,
    pub due_date: Option<Timestamp>,
    pub submission_notes: Option<String>,
    pub submission_url: Option<String>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a task. New tasks always start in `ASSIGNED`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: DbId,
    pub assigned_by_id: DbId,
    pub priority: i16,
    pub due_date: Option<Timestamp>,
}

/// DTO for editing a task. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to_id: Option<DbId>,
    pub priority: Option<i16>,
    pub due_date: Option<Timestamp>,
}

impl UpdateTask {
    pub fn apply(&self, task: &mut Task) {
        if let Some(v) = &self.title {
            task.title = v.clone();
        }
        if let Some(v) = &self.description {
            task.description = Some(v.clone());
        }
        if let Some(v) = self.assigned_to_id {
            task.assigned_to_id = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.due_date {
            task.due_date = Some(v);
        }
    }
}

/// Filter for task listings. `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub project_id: Option<DbId>,
    pub assigned_to_id: Option<DbId>,
    pub status: Option<TaskStatus>,
    pub due_before: Option<Timestamp>,
}

impl TaskFilter {
    pub fn for_project(project_id: DbId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, t: &Task) -> bool {
        self.project_id.map_or(true, |id| t.project_id == id)
            && self.assigned_to_id.map_or(true, |id| t.assigned_to_id == id)
            && self.status.map_or(true, |s| t.status == s)
            && self
                .due_before
                .map_or(true, |cutoff| t.due_date.is_some_and(|d| d < cutoff))
    }
}
