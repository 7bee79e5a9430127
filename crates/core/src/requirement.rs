//! Versioned requirement documents.

use crate::error::CoreError;
use crate::machine::{self, Edge};

string_enum! {
    pub enum RequirementStatus {
        Draft => "DRAFT",
        Approved => "APPROVED",
    }
}

string_enum! {
    pub enum RequirementAction {
        Create => "create",
        Update => "update",
        Approve => "approve",
    }
}

pub const REQUIREMENT_EDGES: &[Edge<RequirementStatus, RequirementAction>] = &[Edge {
    action: RequirementAction::Approve,
    from: &[RequirementStatus::Draft],
    to: RequirementStatus::Approved,
    rejection: "Only draft requirements can be approved",
}];

pub fn next_status(
    current: RequirementStatus,
    action: RequirementAction,
) -> Result<RequirementStatus, CoreError> {
    machine::fire(REQUIREMENT_EDGES, current, action)
}

/// Approved requirements are immutable.
pub fn ensure_editable(current: RequirementStatus) -> Result<(), CoreError> {
    if current == RequirementStatus::Approved {
        return Err(CoreError::invalid_state(
            "Approved requirements are immutable; create a new version",
        ));
    }
    Ok(())
}

/// Versions are 1-based and monotonic per project.
pub fn next_version(latest: Option<i32>) -> i32 {
    latest.map_or(1, |v| v + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_start_at_one() {
        assert_eq!(next_version(None), 1);
        assert_eq!(next_version(Some(3)), 4);
    }

    #[test]
    fn approved_requirements_are_immutable() {
        assert!(ensure_editable(RequirementStatus::Draft).is_ok());
        let err = ensure_editable(RequirementStatus::Approved).unwrap_err();
        assert!(err.to_string().contains("new version"));
    }

    #[test]
    fn approve_is_one_way() {
        assert_eq!(
            next_status(RequirementStatus::Draft, RequirementAction::Approve).unwrap(),
            RequirementStatus::Approved
        );
        assert!(next_status(RequirementStatus::Approved, RequirementAction::Approve).is_err());
    }
}
