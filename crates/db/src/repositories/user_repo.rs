//! Repository for the `users` table.

use agency_core::tier::{Tier, TierStats};
use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::user::{NewUser, User, UserFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, role, status, tier, completed_projects, \
    average_rating, total_reviews, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    pub async fn create(conn: &mut PgConnection, input: &NewUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, role, status, tier) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(input.role.as_str())
            .bind(input.status.as_str())
            .bind(Tier::Trainee.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List users matching the filter, ordered by id.
    pub async fn list(conn: &mut PgConnection, filter: &UserFilter) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE ($1::TEXT IS NULL OR role = $1) \
               AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(filter.role.map(|r| r.as_str()))
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&mut *conn)
            .await
    }

    /// Write the fields owned by the tier engine.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_tier(
        conn: &mut PgConnection,
        id: DbId,
        stats: &TierStats,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                tier = $2, \
                completed_projects = $3, \
                average_rating = $4, \
                total_reviews = $5, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(stats.tier.as_str())
            .bind(stats.completed_projects)
            .bind(stats.average_rating)
            .bind(stats.total_reviews)
            .fetch_optional(&mut *conn)
            .await
    }
}
