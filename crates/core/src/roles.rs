//! User roles, account statuses and the acting identity.
//!
//! Role strings must match the `users.role` CHECK constraint in the
//! initial migration.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

string_enum! {
    /// Agency role attached to every user account.
    pub enum Role {
        Admin => "ADMIN",
        Manager => "MANAGER",
        TeamLead => "TEAM_LEAD",
        Developer => "DEVELOPER",
        Designer => "DESIGNER",
    }
}

string_enum! {
    /// Account lifecycle status. Only `ACTIVE` users receive work.
    pub enum UserStatus {
        Active => "ACTIVE",
        Invited => "INVITED",
        Suspended => "SUSPENDED",
    }
}

/// The role + identity combination attempting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_string_form() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
    }

    #[test]
    fn unknown_role_is_rejected_with_the_valid_set() {
        let err = "OWNER".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("TEAM_LEAD"));
    }

    #[test]
    fn role_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&Role::TeamLead).unwrap();
        assert_eq!(json, "\"TEAM_LEAD\"");
    }
}
