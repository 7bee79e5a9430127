use crate::types::DbId;

/// Domain error taxonomy shared by every layer above `agency-core`.
///
/// `NotFound`, `Forbidden`, `InvalidState` and `Conflict` are caller logic
/// errors: they abort a transition before any write and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidState`].
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Shorthand for [`CoreError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_id() {
        let err = CoreError::NotFound {
            entity: "Task",
            id: 9,
        };
        assert_eq!(err.to_string(), "Entity not found: Task with id 9");
    }

    #[test]
    fn invalid_state_keeps_reason() {
        let err = CoreError::invalid_state("Only submitted assets can be approved");
        assert_eq!(
            err.to_string(),
            "Invalid state: Only submitted assets can be approved"
        );
    }
}
