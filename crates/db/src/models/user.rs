//! User account models.

use agency_core::roles::{Role, UserStatus};
use agency_core::tier::{Tier, TierStats};
use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(try_from = "String")]
    pub status: UserStatus,
    #[sqlx(try_from = "String")]
    pub tier: Tier,
    pub completed_projects: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Tier fields as last written by the tier engine.
    pub fn tier_stats(&self) -> TierStats {
        TierStats {
            tier: self.tier,
            completed_projects: self.completed_projects,
            average_rating: self.average_rating,
            total_reviews: self.total_reviews,
        }
    }
}

/// DTO for inserting a user. Accounts start at TRAINEE with no reviews.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
}

/// Filter for user listings. `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn active(role: Role) -> Self {
        Self {
            role: Some(role),
            status: Some(UserStatus::Active),
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.role.map_or(true, |r| user.role == r)
            && self.status.map_or(true, |s| user.status == s)
    }
}
