//! Repository for the `fiverr_accounts` table.

use agency_core::types::DbId;
use sqlx::PgConnection;

use crate::models::fiverr_account::{FiverrAccount, NewFiverrAccount};

const COLUMNS: &str = "id, name, is_active, created_at";

pub struct FiverrAccountRepo;

impl FiverrAccountRepo {
    /// Insert an account. A duplicate name violates `uq_fiverr_accounts_name`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewFiverrAccount,
    ) -> Result<FiverrAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO fiverr_accounts (name) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FiverrAccount>(&query)
            .bind(&input.name)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<FiverrAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fiverr_accounts WHERE id = $1");
        sqlx::query_as::<_, FiverrAccount>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn list(conn: &mut PgConnection) -> Result<Vec<FiverrAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fiverr_accounts ORDER BY id");
        sqlx::query_as::<_, FiverrAccount>(&query)
            .fetch_all(&mut *conn)
            .await
    }
}
