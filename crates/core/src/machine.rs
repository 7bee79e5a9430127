//! Shared transition-table plumbing for the entity state machines.
//!
//! Each machine declares a `const` slice of [`Edge`]s. An edge names the
//! action, every status it may fire from, the status it lands in, and the
//! message returned when it is fired from anywhere else. Keeping multiple
//! source statuses on one edge keeps the legal-transition set auditable in
//! a single table per entity.

use std::fmt::Debug;

use crate::error::CoreError;

/// One named transition in a state machine table.
#[derive(Debug)]
pub struct Edge<S: 'static, A> {
    pub action: A,
    pub from: &'static [S],
    pub to: S,
    pub rejection: &'static str,
}

/// Resolve the status reached by firing `action` from `current`.
///
/// Returns [`CoreError::InvalidState`] carrying the edge's rejection
/// message when `current` is not a legal source.
pub fn fire<S, A>(edges: &[Edge<S, A>], current: S, action: A) -> Result<S, CoreError>
where
    S: Copy + PartialEq,
    A: Copy + PartialEq + Debug,
{
    let edge = edges
        .iter()
        .find(|e| e.action == action)
        .ok_or_else(|| {
            CoreError::Internal(format!("{action:?} is not a status transition"))
        })?;

    if edge.from.contains(&current) {
        Ok(edge.to)
    } else {
        Err(CoreError::InvalidState(edge.rejection.to_string()))
    }
}

/// Whether `action` may fire from `current` according to `edges`.
pub fn can_fire<S, A>(edges: &[Edge<S, A>], current: S, action: A) -> bool
where
    S: Copy + PartialEq,
    A: Copy + PartialEq,
{
    edges
        .iter()
        .any(|e| e.action == action && e.from.contains(&current))
}
