//! Revision models.

use agency_core::revision::RevisionStatus;
use agency_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `revisions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Revision {
    pub id: DbId,
    pub project_id: DbId,
    pub created_by_id: DbId,
    pub assigned_team_lead_id: Option<DbId>,
    pub assigned_developer_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub status: RevisionStatus,
    pub description: String,
    pub developer_message: Option<String>,
    pub manager_accepted: bool,
    pub is_paid: bool,
    pub submitted_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a revision. New revisions start in `PENDING`.
#[derive(Debug, Clone)]
pub struct NewRevision {
    pub project_id: DbId,
    pub created_by_id: DbId,
    pub assigned_team_lead_id: Option<DbId>,
    pub description: String,
    pub is_paid: bool,
}

/// Filter for revision listings. `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevisionFilter {
    pub project_id: Option<DbId>,
    pub status: Option<RevisionStatus>,
    pub assigned_team_lead_id: Option<DbId>,
    pub assigned_developer_id: Option<DbId>,
    pub created_by_id: Option<DbId>,
}

impl RevisionFilter {
    pub fn for_project(project_id: DbId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, r: &Revision) -> bool {
        self.project_id.map_or(true, |id| r.project_id == id)
            && self.status.map_or(true, |s| r.status == s)
            && self
                .assigned_team_lead_id
                .map_or(true, |id| r.assigned_team_lead_id == Some(id))
            && self
                .assigned_developer_id
                .map_or(true, |id| r.assigned_developer_id == Some(id))
            && self.created_by_id.map_or(true, |id| r.created_by_id == id)
    }
}
