//! Developer task status machine.

use crate::error::CoreError;
use crate::machine::{self, Edge};

string_enum! {
    pub enum TaskStatus {
        Assigned => "ASSIGNED",
        InProgress => "IN_PROGRESS",
        Submitted => "SUBMITTED",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

string_enum! {
    pub enum TaskAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
        Start => "start",
        Submit => "submit",
        Approve => "approve",
        Reject => "reject",
    }
}

/// Lowest accepted task priority.
pub const MIN_PRIORITY: i16 = 0;

/// Highest accepted task priority.
pub const MAX_PRIORITY: i16 = 10;

use TaskStatus::*;

pub const TASK_EDGES: &[Edge<TaskStatus, TaskAction>] = &[
    Edge {
        action: TaskAction::Start,
        from: &[Assigned, Rejected],
        to: InProgress,
        rejection: "Only assigned or rejected tasks can be started",
    },
    Edge {
        action: TaskAction::Submit,
        from: &[InProgress, Rejected],
        to: Submitted,
        rejection: "Only in-progress or rejected tasks can be submitted",
    },
    Edge {
        action: TaskAction::Approve,
        from: &[Submitted],
        to: Approved,
        rejection: "Only submitted tasks can be approved",
    },
    Edge {
        action: TaskAction::Reject,
        from: &[Submitted],
        to: Rejected,
        rejection: "Only submitted tasks can be rejected",
    },
];

impl TaskStatus {
    /// Counted against a developer's load by the suggestion scorer.
    pub fn is_active(self) -> bool {
        matches!(self, Assigned | InProgress)
    }
}

pub fn next_status(current: TaskStatus, action: TaskAction) -> Result<TaskStatus, CoreError> {
    machine::fire(TASK_EDGES, current, action)
}

/// Approved tasks are locked against update and delete.
pub fn ensure_mutable(current: TaskStatus) -> Result<(), CoreError> {
    if current == Approved {
        return Err(CoreError::invalid_state(
            "Approved tasks cannot be modified or deleted",
        ));
    }
    Ok(())
}

pub fn validate_priority(priority: i16) -> Result<(), CoreError> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(CoreError::validation(format!(
            "Task priority must be between {MIN_PRIORITY} and {MAX_PRIORITY} (got {priority})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_succeeds_only_from_submitted() {
        for status in TaskStatus::ALL {
            let result = next_status(*status, TaskAction::Approve);
            if *status == Submitted {
                assert_eq!(result.unwrap(), Approved);
            } else {
                assert!(
                    matches!(result, Err(CoreError::InvalidState(_))),
                    "approve from {status} must be InvalidState"
                );
            }
        }
    }

    #[test]
    fn start_reenters_from_rejected() {
        assert_eq!(next_status(Assigned, TaskAction::Start).unwrap(), InProgress);
        assert_eq!(next_status(Rejected, TaskAction::Start).unwrap(), InProgress);
        assert!(next_status(Submitted, TaskAction::Start).is_err());
    }

    #[test]
    fn submit_accepts_rejected_resubmission() {
        assert_eq!(next_status(Rejected, TaskAction::Submit).unwrap(), Submitted);
        assert!(next_status(Assigned, TaskAction::Submit).is_err());
    }

    #[test]
    fn approved_tasks_are_locked() {
        assert!(ensure_mutable(Approved).is_err());
        assert!(ensure_mutable(Rejected).is_ok());
    }

    #[test]
    fn priority_bounds() {
        assert!(validate_priority(0).is_ok());
        assert!(validate_priority(10).is_ok());
        assert!(validate_priority(11).is_err());
        assert!(validate_priority(-1).is_err());
    }

    #[test]
    fn only_assigned_and_in_progress_count_as_active() {
        let active: Vec<_> = TaskStatus::ALL.iter().filter(|s| s.is_active()).collect();
        assert_eq!(active, vec![&Assigned, &InProgress]);
    }
}
