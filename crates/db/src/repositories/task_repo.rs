//! Repository for the `tasks` table.

use std::collections::HashMap;

use agency_core::task::TaskStatus;
use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::task::{NewTask, Task, TaskFilter};

const COLUMNS: &str = "id, project_id, title, description, assigned_to_id, assigned_by_id, \
    status, priority, due_date, submission_notes, submission_url, rejection_reason, \
    submitted_at, approved_at, created_at, updated_at";

/// Provides CRUD operations for developer tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task in status `ASSIGNED`.
    pub async fn create(conn: &mut PgConnection, input: &NewTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks \
                (project_id, title, description, assigned_to_id, assigned_by_id, status, \
                 priority, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.assigned_to_id)
            .bind(input.assigned_by_id)
            .bind(TaskStatus::Assigned.as_str())
            .bind(input.priority)
            .bind(input.due_date)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List tasks matching the filter, ordered by id.
    pub async fn list(conn: &mut PgConnection, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE ($1::BIGINT IS NULL OR project_id = $1) \
               AND ($2::BIGINT IS NULL OR assigned_to_id = $2) \
               AND ($3::TEXT IS NULL OR status = $3) \
               AND ($4::TIMESTAMPTZ IS NULL OR due_date < $4) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(filter.project_id)
            .bind(filter.assigned_to_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.due_before)
            .fetch_all(&mut *conn)
            .await
    }

    /// Write every mutable column of `task`.
    pub async fn update(conn: &mut PgConnection, task: &Task) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET \
                title = $2, \
                description = $3, \
                assigned_to_id = $4, \
                status = $5, \
                priority = $6, \
                due_date = $7, \
                submission_notes = $8, \
                submission_url = $9, \
                rejection_reason = $10, \
                submitted_at = $11, \
                approved_at = $12, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.assigned_to_id)
            .bind(task.status.as_str())
            .bind(task.priority)
            .bind(task.due_date)
            .bind(&task.submission_notes)
            .bind(&task.submission_url)
            .bind(&task.rejection_reason)
            .bind(task.submitted_at)
            .bind(task.approved_at)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count ASSIGNED + IN_PROGRESS tasks per developer across all projects.
    pub async fn active_counts(conn: &mut PgConnection) -> Result<HashMap<DbId, i64>, sqlx::Error> {
        let rows: Vec<(DbId, i64)> = sqlx::query_as(
            "SELECT assigned_to_id, COUNT(*) FROM tasks \
             WHERE status IN ($1, $2) \
             GROUP BY assigned_to_id",
        )
        .bind(TaskStatus::Assigned.as_str())
        .bind(TaskStatus::InProgress.as_str())
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
