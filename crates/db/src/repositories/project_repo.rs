//! Repository for the `projects` table.

use agency_core::project::ProjectStatus;
use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::project::{NewProject, Project, ProjectFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, internal_name, client_name, fiverr_account_id, fiverr_order_id, \
    status, priority, complexity, manager_id, team_lead_id, designer_id, budget_cents, \
    deadline, internal_deadline, completed_at, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in status `NEW`, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &NewProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                (internal_name, client_name, fiverr_account_id, fiverr_order_id, status, \
                 priority, complexity, manager_id, budget_cents, deadline, internal_deadline) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.internal_name)
            .bind(&input.client_name)
            .bind(input.fiverr_account_id)
            .bind(&input.fiverr_order_id)
            .bind(ProjectStatus::New.as_str())
            .bind(input.priority.as_str())
            .bind(input.complexity.as_str())
            .bind(input.manager_id)
            .bind(input.budget_cents)
            .bind(input.deadline)
            .bind(input.internal_deadline)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a project and take a row lock held until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List projects matching the filter, ordered by id.
    pub async fn list(conn: &mut PgConnection, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::BIGINT IS NULL OR manager_id = $2) \
               AND ($3::BIGINT IS NULL OR team_lead_id = $3) \
               AND ($4::BIGINT IS NULL OR designer_id = $4) \
               AND ($5::TIMESTAMPTZ IS NULL OR updated_at < $5) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.manager_id)
            .bind(filter.team_lead_id)
            .bind(filter.designer_id)
            .bind(filter.updated_before)
            .fetch_all(&mut *conn)
            .await
    }

    /// Write every mutable column of `project`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(conn: &mut PgConnection, project: &Project) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                internal_name = $2, \
                client_name = $3, \
                fiverr_order_id = $4, \
                status = $5, \
                priority = $6, \
                complexity = $7, \
                team_lead_id = $8, \
                designer_id = $9, \
                budget_cents = $10, \
                deadline = $11, \
                internal_deadline = $12, \
                completed_at = $13, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(project.id)
            .bind(&project.internal_name)
            .bind(&project.client_name)
            .bind(&project.fiverr_order_id)
            .bind(project.status.as_str())
            .bind(project.priority.as_str())
            .bind(project.complexity.as_str())
            .bind(project.team_lead_id)
            .bind(project.designer_id)
            .bind(project.budget_cents)
            .bind(project.deadline)
            .bind(project.internal_deadline)
            .bind(project.completed_at)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Delete a project. Child rows go with it through `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
