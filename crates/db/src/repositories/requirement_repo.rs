//! Repository for the `requirements` table.

use agency_core::requirement::RequirementStatus;
use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::requirement::{NewRequirement, Requirement};

const COLUMNS: &str = "id, project_id, version, status, content, created_by_id, \
    approved_by_id, approved_at, created_at, updated_at";

pub struct RequirementRepo;

impl RequirementRepo {
    /// Insert a requirement version in status `DRAFT`.
    ///
    /// `(project_id, version)` is unique.
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewRequirement,
    ) -> Result<Requirement, sqlx::Error> {
        let query = format!(
            "INSERT INTO requirements (project_id, version, status, content, created_by_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Requirement>(&query)
            .bind(input.project_id)
            .bind(input.version)
            .bind(RequirementStatus::Draft.as_str())
            .bind(&input.content)
            .bind(input.created_by_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Requirement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requirements WHERE id = $1");
        sqlx::query_as::<_, Requirement>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// All versions for a project, oldest first.
    pub async fn list_by_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Vec<Requirement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requirements WHERE project_id = $1 ORDER BY version"
        );
        sqlx::query_as::<_, Requirement>(&query)
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn latest_version(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(version) FROM requirements WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        requirement: &Requirement,
    ) -> Result<Option<Requirement>, sqlx::Error> {
        let query = format!(
            "UPDATE requirements SET \
                status = $2, \
                content = $3, \
                approved_by_id = $4, \
                approved_at = $5, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Requirement>(&query)
            .bind(requirement.id)
            .bind(requirement.status.as_str())
            .bind(&requirement.content)
            .bind(requirement.approved_by_id)
            .bind(requirement.approved_at)
            .fetch_optional(&mut *conn)
            .await
    }
}
