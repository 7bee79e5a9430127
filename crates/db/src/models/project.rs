//! Project models.

use agency_core::policy::ProjectScope;
use agency_core::project::{ProjectComplexity, ProjectPriority, ProjectStatus};
use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub internal_name: String,
    pub client_name: Option<String>,
    pub fiverr_account_id: DbId,
    pub fiverr_order_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    #[sqlx(try_from = "String")]
    pub priority: ProjectPriority,
    #[sqlx(try_from = "String")]
    pub complexity: ProjectComplexity,
    pub manager_id: DbId,
    pub team_lead_id: Option<DbId>,
    pub designer_id: Option<DbId>,
    pub budget_cents: Option<i64>,
    pub deadline: Option<Timestamp>,
    pub internal_deadline: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Ownership edges consulted by the authorization policy.
    pub fn scope(&self) -> ProjectScope {
        ProjectScope {
            manager_id: self.manager_id,
            team_lead_id: self.team_lead_id,
            designer_id: self.designer_id,
        }
    }

    /// Everyone attached to the project, manager first, without duplicates.
    pub fn participants(&self) -> Vec<DbId> {
        let mut ids = vec![self.manager_id];
        for id in [self.team_lead_id, self.designer_id].into_iter().flatten() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// DTO for inserting a project. New projects always start in `NEW`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub internal_name: String,
    pub client_name: Option<String>,
    pub fiverr_account_id: DbId,
    pub fiverr_order_id: Option<String>,
    pub priority: ProjectPriority,
    pub complexity: ProjectComplexity,
    pub manager_id: DbId,
    pub budget_cents: Option<i64>,
    pub deadline: Option<Timestamp>,
    pub internal_deadline: Option<Timestamp>,
}

/// DTO for editing a project. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub internal_name: Option<String>,
    pub client_name: Option<String>,
    pub fiverr_order_id: Option<String>,
    pub priority: Option<ProjectPriority>,
    pub complexity: Option<ProjectComplexity>,
    pub budget_cents: Option<i64>,
    pub deadline: Option<Timestamp>,
    pub internal_deadline: Option<Timestamp>,
}

impl UpdateProject {
    pub fn apply(&self, project: &mut Project) {
        if let Some(v) = &self.internal_name {
            project.internal_name = v.clone();
        }
        if let Some(v) = &self.client_name {
            project.client_name = Some(v.clone());
        }
        if let Some(v) = &self.fiverr_order_id {
            project.fiverr_order_id = Some(v.clone());
        }
        if let Some(v) = self.priority {
            project.priority = v;
        }
        if let Some(v) = self.complexity {
            project.complexity = v;
        }
        if let Some(v) = self.budget_cents {
            project.budget_cents = Some(v);
        }
        if let Some(v) = self.deadline {
            project.deadline = Some(v);
        }
        if let Some(v) = self.internal_deadline {
            project.internal_deadline = Some(v);
        }
    }
}

/// Filter for project listings. `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub manager_id: Option<DbId>,
    pub team_lead_id: Option<DbId>,
    pub designer_id: Option<DbId>,
    pub updated_before: Option<Timestamp>,
}

impl ProjectFilter {
    pub fn matches(&self, p: &Project) -> bool {
        self.status.map_or(true, |s| p.status == s)
            && self.manager_id.map_or(true, |id| p.manager_id == id)
            && self.team_lead_id.map_or(true, |id| p.team_lead_id == Some(id))
            && self.designer_id.map_or(true, |id| p.designer_id == Some(id))
            && self.updated_before.map_or(true, |t| p.updated_at < t)
    }
}
