//! Realtime channel names and the event catalogue pushed to clients.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::types::DbId;

/// A realtime fan-out channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// `user:{id}`: every connection of one user.
    User(DbId),
    /// `project:{id}`: every connection subscribed to one project.
    Project(DbId),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::User(id) => write!(f, "user:{id}"),
            Channel::Project(id) => write!(f, "project:{id}"),
        }
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

string_enum! {
    /// Realtime event names.
    pub enum EventName {
        NotificationNew => "notification:new",
        TaskAssigned => "task:assigned",
        TaskStatusChanged => "task:status:changed",
        AssetSubmitted => "asset:submitted",
        AssetApproved => "asset:approved",
        ProjectUpdated => "project:updated",
        ProjectCompleted => "project:completed",
        RevisionCreated => "revision:created",
        RevisionAssigned => "revision:assigned",
        RevisionSubmitted => "revision:submitted",
        RevisionCompleted => "revision:completed",
        RevisionPendingNew => "revision:pending:new",
        ChatMessage => "chat:message",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_follow_protocol() {
        assert_eq!(Channel::User(4).to_string(), "user:4");
        assert_eq!(Channel::Project(12).to_string(), "project:12");
        assert_eq!(
            serde_json::to_value(Channel::Project(1)).unwrap(),
            serde_json::json!("project:1")
        );
    }

    #[test]
    fn event_names_parse_back() {
        for name in EventName::ALL {
            assert_eq!(name.as_str().parse::<EventName>().unwrap(), *name);
        }
        assert_eq!(EventName::ALL.len(), 13);
    }
}
