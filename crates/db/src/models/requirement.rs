//! Versioned requirement models.

use agency_core::requirement::RequirementStatus;
use agency_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `requirements` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Requirement {
    pub id: DbId,
    pub project_id: DbId,
    pub version: i32,
    #[sqlx(try_from = "String")]
    pub status: RequirementStatus,
    pub content: String,
    pub created_by_id: DbId,
    pub approved_by_id: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a requirement version. New versions start in `DRAFT`.
#[derive(Debug, Clone)]
pub struct NewRequirement {
    pub project_id: DbId,
    pub version: i32,
    pub content: String,
    pub created_by_id: DbId,
}
