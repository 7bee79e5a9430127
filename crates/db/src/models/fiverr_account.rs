//! Fiverr seller account models. Every project is sold through one.

use agency_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `fiverr_accounts` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct FiverrAccount {
    pub id: DbId,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for creating an account. Names are unique.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFiverrAccount {
    pub name: String,
}
