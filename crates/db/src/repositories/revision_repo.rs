//! Repository for the `revisions` table.

use agency_core::revision::RevisionStatus;
use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::revision::{NewRevision, Revision, RevisionFilter};

const COLUMNS: &str = "id, project_id, created_by_id, assigned_team_lead_id, \
    assigned_developer_id, status, description, developer_message, manager_accepted, is_paid, \
    submitted_at, completed_at, accepted_at, created_at, updated_at";

pub struct RevisionRepo;

impl RevisionRepo {
    /// Insert a new revision in status `PENDING`.
    pub async fn create(conn: &mut PgConnection, input: &NewRevision) -> Result<Revision, sqlx::Error> {
        let query = format!(
            "INSERT INTO revisions \
                (project_id, created_by_id, assigned_team_lead_id, status, description, is_paid) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(input.project_id)
            .bind(input.created_by_id)
            .bind(input.assigned_team_lead_id)
            .bind(RevisionStatus::Pending.as_str())
            .bind(&input.description)
            .bind(input.is_paid)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM revisions WHERE id = $1");
        sqlx::query_as::<_, Revision>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List revisions matching the filter, ordered by id.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &RevisionFilter,
    ) -> Result<Vec<Revision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions \
             WHERE ($1::BIGINT IS NULL OR project_id = $1) \
               AND ($2::TEXT IS NULL OR status = $2) \
               AND ($3::BIGINT IS NULL OR assigned_team_lead_id = $3) \
               AND ($4::BIGINT IS NULL OR assigned_developer_id = $4) \
               AND ($5::BIGINT IS NULL OR created_by_id = $5) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(filter.project_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.assigned_team_lead_id)
            .bind(filter.assigned_developer_id)
            .bind(filter.created_by_id)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        revision: &Revision,
    ) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!(
            "UPDATE revisions SET \
                assigned_developer_id = $2, \
                status = $3, \
                description = $4, \
                developer_message = $5, \
                manager_accepted = $6, \
                is_paid = $7, \
                submitted_at = $8, \
                completed_at = $9, \
                accepted_at = $10, \
                assigned_team_lead_id = $11, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(revision.id)
            .bind(revision.assigned_developer_id)
            .bind(revision.status.as_str())
            .bind(&revision.description)
            .bind(&revision.developer_message)
            .bind(revision.manager_accepted)
            .bind(revision.is_paid)
            .bind(revision.submitted_at)
            .bind(revision.completed_at)
            .bind(revision.accepted_at)
            .bind(revision.assigned_team_lead_id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revisions WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
