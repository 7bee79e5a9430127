//! Design asset status machine.

use crate::error::CoreError;
use crate::machine::{self, Edge};

string_enum! {
    pub enum AssetStatus {
        Requested => "REQUESTED",
        InProgress => "IN_PROGRESS",
        Submitted => "SUBMITTED",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

string_enum! {
    pub enum AssetAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
        Start => "start",
        Submit => "submit",
        Approve => "approve",
        Reject => "reject",
    }
}

use AssetStatus::*;

pub const ASSET_EDGES: &[Edge<AssetStatus, AssetAction>] = &[
    Edge {
        action: AssetAction::Start,
        from: &[Requested, Rejected],
        to: InProgress,
        rejection: "Only requested or rejected assets can be started",
    },
    Edge {
        action: AssetAction::Submit,
        from: &[InProgress, Requested, Rejected],
        to: Submitted,
        rejection: "Only requested, in-progress or rejected assets can be submitted",
    },
    Edge {
        action: AssetAction::Approve,
        from: &[Submitted],
        to: Approved,
        rejection: "Only submitted assets can be approved",
    },
    Edge {
        action: AssetAction::Reject,
        from: &[Submitted],
        to: Rejected,
        rejection: "Only submitted assets can be rejected",
    },
];

pub fn next_status(current: AssetStatus, action: AssetAction) -> Result<AssetStatus, CoreError> {
    machine::fire(ASSET_EDGES, current, action)
}

pub fn ensure_mutable(current: AssetStatus) -> Result<(), CoreError> {
    if current == Approved {
        return Err(CoreError::invalid_state(
            "Approved assets cannot be modified or deleted",
        ));
    }
    Ok(())
}

/// A design request needs somebody to design it.
pub fn ensure_designer_assigned(designer_id: Option<crate::types::DbId>) -> Result<(), CoreError> {
    if designer_id.is_none() {
        return Err(CoreError::invalid_state(
            "Project must have a designer assigned before assets can be requested",
        ));
    }
    Ok(())
}
