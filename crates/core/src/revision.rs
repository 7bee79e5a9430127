//! Post-delivery revision status machine.
//!
//! A revision walks PENDING → IN_PROGRESS → SUBMITTED → COMPLETED across
//! three actors (Manager creates, TeamLead assigns and completes, Developer
//! works and submits), then carries a one-way `manager_accepted` flag.
//!
//! The four actor work queues ([`RevisionQueue`]) are disjoint by
//! construction: [`queue_of`] places every revision in at most one.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::machine::{self, Edge};
use crate::types::{DbId, Timestamp};

string_enum! {
    pub enum RevisionStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Submitted => "SUBMITTED",
        Completed => "COMPLETED",
    }
}

string_enum! {
    pub enum RevisionAction {
        Create => "create",
        AssignDeveloper => "assignDeveloper",
        Start => "start",
        Submit => "submit",
        Complete => "complete",
        ManagerAccept => "managerAccept",
        Delete => "delete",
    }
}

use RevisionStatus::*;

pub const REVISION_EDGES: &[Edge<RevisionStatus, RevisionAction>] = &[
    Edge {
        action: RevisionAction::AssignDeveloper,
        from: &[Pending],
        to: InProgress,
        rejection: "Only pending revisions can be assigned to a developer",
    },
    Edge {
        action: RevisionAction::Start,
        from: &[Pending],
        to: InProgress,
        rejection: "Only pending revisions can be started",
    },
    Edge {
        action: RevisionAction::Submit,
        from: &[InProgress],
        to: Submitted,
        rejection: "Only in-progress revisions can be submitted",
    },
    Edge {
        action: RevisionAction::Complete,
        from: &[Submitted],
        to: Completed,
        rejection: "Only submitted revisions can be completed",
    },
];

pub fn next_status(
    current: RevisionStatus,
    action: RevisionAction,
) -> Result<RevisionStatus, CoreError> {
    machine::fire(REVISION_EDGES, current, action)
}

/// Assignment is allowed once and implies start.
pub fn assign_developer(
    current: RevisionStatus,
    assigned_developer_id: Option<DbId>,
) -> Result<RevisionStatus, CoreError> {
    if assigned_developer_id.is_some() {
        return Err(CoreError::invalid_state(
            "A developer is already assigned to this revision",
        ));
    }
    next_status(current, RevisionAction::AssignDeveloper)
}

/// Explicit start for an assignee whose revision was not auto-started.
pub fn start(
    current: RevisionStatus,
    assigned_developer_id: Option<DbId>,
) -> Result<RevisionStatus, CoreError> {
    if assigned_developer_id.is_none() {
        return Err(CoreError::invalid_state(
            "Revision has no assigned developer yet",
        ));
    }
    next_status(current, RevisionAction::Start)
}

/// `managerAccept` is permitted exactly once, and only after completion.
pub fn manager_accept(current: RevisionStatus, manager_accepted: bool) -> Result<(), CoreError> {
    if current != Completed {
        return Err(CoreError::invalid_state(
            "Only completed revisions can be accepted",
        ));
    }
    if manager_accepted {
        return Err(CoreError::invalid_state(
            "Revision has already been accepted",
        ));
    }
    Ok(())
}

pub fn ensure_deletable(current: RevisionStatus) -> Result<(), CoreError> {
    if current == Completed {
        return Err(CoreError::invalid_state(
            "Completed revisions cannot be deleted",
        ));
    }
    Ok(())
}

/// Still blocking project completion.
pub fn is_outstanding(status: RevisionStatus, manager_accepted: bool) -> bool {
    !(status == Completed && manager_accepted)
}

string_enum! {
    /// Actor-scoped FIFO work queues over revisions.
    pub enum RevisionQueue {
        PendingForTeamLead => "pending",
        SubmittedForTeamLead => "submitted",
        CompletedForManager => "completed",
        AssignedToDeveloper => "assigned",
    }
}

/// Timestamp a queue is ordered by (ascending, ties broken by id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueOrder {
    CreatedAt,
    SubmittedAt,
    CompletedAt,
}

impl RevisionQueue {
    pub fn order(self) -> QueueOrder {
        match self {
            RevisionQueue::PendingForTeamLead | RevisionQueue::AssignedToDeveloper => {
                QueueOrder::CreatedAt
            }
            RevisionQueue::SubmittedForTeamLead => QueueOrder::SubmittedAt,
            RevisionQueue::CompletedForManager => QueueOrder::CompletedAt,
        }
    }
}

/// Classify a revision into the single queue it belongs to, if any.
pub fn queue_of(
    status: RevisionStatus,
    manager_accepted: bool,
    assigned_developer_id: Option<DbId>,
) -> Option<RevisionQueue> {
    match (status, assigned_developer_id) {
        (Pending, None) => Some(RevisionQueue::PendingForTeamLead),
        (Pending | InProgress, Some(_)) => Some(RevisionQueue::AssignedToDeveloper),
        (Submitted, _) => Some(RevisionQueue::SubmittedForTeamLead),
        (Completed, _) if !manager_accepted => Some(RevisionQueue::CompletedForManager),
        _ => None,
    }
}

/// Stable FIFO ordering: timestamp ascending, then id ascending.
///
/// Rows with a missing timestamp sort last.
pub fn fifo_sort<T>(items: &mut [T], key: impl Fn(&T) -> (Option<Timestamp>, DbId)) {
    items.sort_by(|a, b| {
        let (ta, ia) = key(a);
        let (tb, ib) = key(b);
        match (ta, tb) {
            (Some(x), Some(y)) => x.cmp(&y).then(ia.cmp(&ib)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => ia.cmp(&ib),
        }
    });
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn assignment_implies_start() {
        assert_eq!(assign_developer(Pending, None).unwrap(), InProgress);
    }

    #[test]
    fn assignment_only_once() {
        let err = assign_developer(Pending, Some(3)).unwrap_err();
        assert!(err.to_string().contains("already assigned"));
    }

    #[test]
    fn complete_requires_submission() {
        assert!(next_status(InProgress, RevisionAction::Complete).is_err());
        assert!(next_status(Pending, RevisionAction::Complete).is_err());
        assert_eq!(
            next_status(Submitted, RevisionAction::Complete).unwrap(),
            Completed
        );
    }

    #[test]
    fn manager_accept_is_one_way() {
        assert!(manager_accept(Completed, false).is_ok());
        assert!(matches!(
            manager_accept(Completed, true),
            Err(CoreError::InvalidState(_))
        ));
        assert!(manager_accept(Submitted, false).is_err());
    }

    #[test]
    fn start_requires_an_assignee() {
        assert!(start(Pending, None).is_err());
        assert_eq!(start(Pending, Some(1)).unwrap(), InProgress);
        assert!(start(InProgress, Some(1)).is_err());
    }

    #[test]
    fn queues_are_disjoint() {
        let mut seen = Vec::new();
        for status in RevisionStatus::ALL {
            for accepted in [false, true] {
                for dev in [None, Some(7)] {
                    let hits = RevisionQueue::ALL
                        .iter()
                        .filter(|q| queue_of(*status, accepted, dev) == Some(**q))
                        .count();
                    assert!(hits <= 1);
                    seen.push(queue_of(*status, accepted, dev));
                }
            }
        }
        for q in RevisionQueue::ALL {
            assert!(seen.contains(&Some(*q)), "queue {q} is unreachable");
        }
    }

    #[test]
    fn accepted_completed_revisions_leave_every_queue() {
        assert_eq!(queue_of(Completed, true, Some(2)), None);
        assert!(!is_outstanding(Completed, true));
        assert!(is_outstanding(Completed, false));
        assert!(is_outstanding(Pending, false));
    }

    #[test]
    fn fifo_sort_breaks_ties_by_id() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(5);
        let mut rows = vec![(9, Some(t1)), (4, Some(t0)), (2, Some(t0)), (1, None)];
        fifo_sort(&mut rows, |r| (r.1, r.0));
        let ids: Vec<_> = rows.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![2, 4, 9, 1]);
    }
}
