//! Project review models.

use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `project_reviews` table. Unique per (project, developer).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProjectReview {
    pub id: DbId,
    pub project_id: DbId,
    pub developer_id: DbId,
    pub reviewer_id: DbId,
    pub rating: i16,
    pub communication: i16,
    pub quality: i16,
    pub timeliness: i16,
    pub professionalism: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectReview {
    /// Every score with its field name, for validation.
    pub fn scores(&self) -> [(&'static str, i16); 5] {
        [
            ("rating", self.rating),
            ("communication", self.communication),
            ("quality", self.quality),
            ("timeliness", self.timeliness),
            ("professionalism", self.professionalism),
        ]
    }
}

/// DTO for inserting a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub project_id: DbId,
    pub developer_id: DbId,
    pub reviewer_id: DbId,
    pub rating: i16,
    pub communication: i16,
    pub quality: i16,
    pub timeliness: i16,
    pub professionalism: i16,
    pub comment: Option<String>,
}

impl NewReview {
    pub fn scores(&self) -> [(&'static str, i16); 5] {
        [
            ("rating", self.rating),
            ("communication", self.communication),
            ("quality", self.quality),
            ("timeliness", self.timeliness),
            ("professionalism", self.professionalism),
        ]
    }
}

/// DTO for editing a review. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub rating: Option<i16>,
    pub communication: Option<i16>,
    pub quality: Option<i16>,
    pub timeliness: Option<i16>,
    pub professionalism: Option<i16>,
    pub comment: Option<String>,
}

impl UpdateReview {
    pub fn apply(&self, review: &mut ProjectReview) {
        if let Some(v) = self.rating {
            review.rating = v;
        }
        if let Some(v) = self.communication {
            review.communication = v;
        }
        if let Some(v) = self.quality {
            review.quality = v;
        }
        if let Some(v) = self.timeliness {
            review.timeliness = v;
        }
        if let Some(v) = self.professionalism {
            review.professionalism = v;
        }
        if let Some(v) = &self.comment {
            review.comment = Some(v.clone());
        }
    }
}

/// Filter for review listings. `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilter {
    pub project_id: Option<DbId>,
    pub developer_id: Option<DbId>,
}

impl ReviewFilter {
    pub fn matches(&self, r: &ProjectReview) -> bool {
        self.project_id.map_or(true, |id| r.project_id == id)
            && self.developer_id.map_or(true, |id| r.developer_id == id)
    }
}
