//! Repository for the `project_reviews` table.

use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::review::{NewReview, ProjectReview, ReviewFilter};

const COLUMNS: &str = "id, project_id, developer_id, reviewer_id, rating, communication, \
    quality, timeliness, professionalism, comment, created_at, updated_at";

pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review. A second review for the same (project, developer)
    /// violates `uq_project_reviews_project_developer`.
    pub async fn create(conn: &mut PgConnection, input: &NewReview) -> Result<ProjectReview, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_reviews \
                (project_id, developer_id, reviewer_id, rating, communication, quality, \
                 timeliness, professionalism, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectReview>(&query)
            .bind(input.project_id)
            .bind(input.developer_id)
            .bind(input.reviewer_id)
            .bind(input.rating)
            .bind(input.communication)
            .bind(input.quality)
            .bind(input.timeliness)
            .bind(input.professionalism)
            .bind(&input.comment)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ProjectReview>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_reviews WHERE id = $1");
        sqlx::query_as::<_, ProjectReview>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn list(
        conn: &mut PgConnection,
        filter: &ReviewFilter,
    ) -> Result<Vec<ProjectReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_reviews \
             WHERE ($1::BIGINT IS NULL OR project_id = $1) \
               AND ($2::BIGINT IS NULL OR developer_id = $2) \
             ORDER BY id"
        );
        sqlx::query_as::<_, ProjectReview>(&query)
            .bind(filter.project_id)
            .bind(filter.developer_id)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        review: &ProjectReview,
    ) -> Result<Option<ProjectReview>, sqlx::Error> {
        let query = format!(
            "UPDATE project_reviews SET \
                rating = $2, \
                communication = $3, \
                quality = $4, \
                timeliness = $5, \
                professionalism = $6, \
                comment = $7, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectReview>(&query)
            .bind(review.id)
            .bind(review.rating)
            .bind(review.communication)
            .bind(review.quality)
            .bind(review.timeliness)
            .bind(review.professionalism)
            .bind(&review.comment)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_reviews WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
