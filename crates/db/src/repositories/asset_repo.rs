//! Repository for the `design_assets` table.

use agency_core::asset::AssetStatus;
use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::asset::{DesignAsset, NewAsset};

const COLUMNS: &str = "id, project_id, title, description, requested_by_id, uploaded_by_id, \
    approved_by_id, status, file_url, rejection_reason, submitted_at, approved_at, \
    created_at, updated_at";

pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new design request in status `REQUESTED`.
    pub async fn create(conn: &mut PgConnection, input: &NewAsset) -> Result<DesignAsset, sqlx::Error> {
        let query = format!(
            "INSERT INTO design_assets (project_id, title, description, requested_by_id, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DesignAsset>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.requested_by_id)
            .bind(AssetStatus::Requested.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DesignAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM design_assets WHERE id = $1");
        sqlx::query_as::<_, DesignAsset>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn list_by_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Vec<DesignAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM design_assets WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, DesignAsset>(&query)
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        asset: &DesignAsset,
    ) -> Result<Option<DesignAsset>, sqlx::Error> {
        let query = format!(
            "UPDATE design_assets SET \
                title = $2, \
                description = $3, \
                uploaded_by_id = $4, \
                approved_by_id = $5, \
                status = $6, \
                file_url = $7, \
                rejection_reason = $8, \
                submitted_at = $9, \
                approved_at = $10, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DesignAsset>(&query)
            .bind(asset.id)
            .bind(&asset.title)
            .bind(&asset.description)
            .bind(asset.uploaded_by_id)
            .bind(asset.approved_by_id)
            .bind(asset.status.as_str())
            .bind(&asset.file_url)
            .bind(&asset.rejection_reason)
            .bind(asset.submitted_at)
            .bind(asset.approved_at)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM design_assets WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
