use agency_core::error::CoreError;
use agency_core::types::DbId;

/// Failures raised by an entity store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    Unique(String),

    /// An update or delete addressed a row that no longer exists.
    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: DbId },

    /// A stored value could not be decoded into a domain type.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let constraint = db.constraint().unwrap_or("unknown");
                tracing::debug!(constraint, "Unique constraint rejected write");
                StoreError::Unique(constraint.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                tracing::warn!(error = %err, "Stored row failed to decode");
                StoreError::Corrupt(err.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unique(constraint) => {
                CoreError::Conflict(format!("Duplicate value violates {constraint}"))
            }
            StoreError::Missing { entity, id } => CoreError::NotFound { entity, id },
            other => CoreError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn decode_failures_are_corrupt_rows() {
        let err = StoreError::from(sqlx::Error::Decode("unknown tier 'LEGEND'".into()));
        assert_matches!(&err, StoreError::Corrupt(msg) if msg.contains("LEGEND"));
        assert_matches!(CoreError::from(err), CoreError::Internal(_));
    }

    #[test]
    fn other_driver_errors_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert_matches!(err, StoreError::Database(sqlx::Error::RowNotFound));
    }

    #[test]
    fn store_errors_map_onto_core_errors() {
        assert_matches!(
            CoreError::from(StoreError::Unique("users_email_key".into())),
            CoreError::Conflict(msg) if msg == "Duplicate value violates users_email_key"
        );
        assert_matches!(
            CoreError::from(StoreError::Missing { entity: "Task", id: 4 }),
            CoreError::NotFound { entity: "Task", id: 4 }
        );
    }
}
