//! Design asset models.

use agency_core::asset::AssetStatus;
use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `design_assets` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DesignAsset {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub requested_by_id: DbId,
    pub uploaded_by_id: Option<DbId>,
    pub approved_by_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub status: AssetStatus,
    pub file_url: Option<String>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a design request. New assets start in `REQUESTED`.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub requested_by_id: DbId,
}

/// DTO for editing a design request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAsset {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateAsset {
    pub fn apply(&self, asset: &mut DesignAsset) {
        if let Some(v) = &self.title {
            asset.title = v.clone();
        }
        if let Some(v) = &self.description {
            asset.description = Some(v.clone());
        }
    }
}
