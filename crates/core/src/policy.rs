//! Table-driven authorization policy.
//!
//! Every action an actor can request is listed once in [`GRANTS`] with the
//! `(role, relation)` pairs that allow it. A relation is a predicate over
//! the entity's owning ids (project manager, team lead, designer,
//! assignee, creator). ADMIN bypasses ownership for every listed action.
//! No action needs more than one approval.
//!
//! [`can_transition`] is pure and side-effect free, so it doubles as the
//! dry-run used for UI permission hints ([`hints`]).

use std::fmt;

use serde::{Serialize, Serializer};

use crate::asset::AssetAction;
use crate::effects::EntityKind;
use crate::error::CoreError;
use crate::project::ProjectAction;
use crate::requirement::RequirementAction;
use crate::revision::RevisionAction;
use crate::roles::{Actor, Role};
use crate::task::TaskAction;
use crate::types::DbId;

string_enum! {
    pub enum ReviewAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
    }
}

/// An authorization-gated operation on one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Project(ProjectAction),
    Requirement(RequirementAction),
    Task(TaskAction),
    Asset(AssetAction),
    Revision(RevisionAction),
    Review(ReviewAction),
}

impl Action {
    pub fn entity(self) -> EntityKind {
        match self {
            Action::Project(_) => EntityKind::Project,
            Action::Requirement(_) => EntityKind::Requirement,
            Action::Task(_) => EntityKind::Task,
            Action::Asset(_) => EntityKind::DesignAsset,
            Action::Revision(_) => EntityKind::Revision,
            Action::Review(_) => EntityKind::ProjectReview,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Action::Project(a) => a.as_str(),
            Action::Requirement(a) => a.as_str(),
            Action::Task(a) => a.as_str(),
            Action::Asset(a) => a.as_str(),
            Action::Revision(a) => a.as_str(),
            Action::Review(a) => a.as_str(),
        }
    }

    /// Every action defined for an entity kind, in table order.
    pub fn for_entity(kind: EntityKind) -> Vec<Action> {
        GRANTS
            .iter()
            .map(|g| g.action)
            .filter(|a| a.entity() == kind)
            .collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity(), self.name())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Owning relations of the entity being acted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectScope {
    pub manager_id: DbId,
    pub team_lead_id: Option<DbId>,
    pub designer_id: Option<DbId>,
}

/// Snapshot of an entity's ownership edges, as seen by the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Subject {
    pub project: ProjectScope,
    /// Task assignee or revision developer.
    pub assignee_id: Option<DbId>,
    /// Revision creator or asset requester.
    pub creator_id: Option<DbId>,
    /// Team lead copied onto a revision at creation.
    pub team_lead_id: Option<DbId>,
}

impl Subject {
    pub fn project(project: ProjectScope) -> Self {
        Self {
            project,
            ..Self::default()
        }
    }

    pub fn with_assignee(mut self, id: Option<DbId>) -> Self {
        self.assignee_id = id;
        self
    }

    pub fn with_creator(mut self, id: Option<DbId>) -> Self {
        self.creator_id = id;
        self
    }

    pub fn with_team_lead(mut self, id: Option<DbId>) -> Self {
        self.team_lead_id = id;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    ProjectManager,
    ProjectTeamLead,
    ProjectDesigner,
    Assignee,
    Creator,
    /// The revision's copied team lead, falling back to the project's.
    RevisionTeamLead,
}

impl Relation {
    fn holds(self, user_id: DbId, subject: &Subject) -> bool {
        match self {
            Relation::ProjectManager => subject.project.manager_id == user_id,
            Relation::ProjectTeamLead => subject.project.team_lead_id == Some(user_id),
            Relation::ProjectDesigner => subject.project.designer_id == Some(user_id),
            Relation::Assignee => subject.assignee_id == Some(user_id),
            Relation::Creator => subject.creator_id == Some(user_id),
            Relation::RevisionTeamLead => {
                subject.team_lead_id.or(subject.project.team_lead_id) == Some(user_id)
            }
        }
    }
}

struct Grant {
    action: Action,
    allow: &'static [(Role, Relation)],
    denial: &'static str,
}

use Relation::*;
use Role::{Designer, Developer, Manager, TeamLead};

const GRANTS: &[Grant] = &[
    // --- Project ---
    Grant {
        action: Action::Project(ProjectAction::Create),
        allow: &[],
        denial: "Only admins can create projects",
    },
    Grant {
        action: Action::Project(ProjectAction::Update),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can update the project",
    },
    Grant {
        action: Action::Project(ProjectAction::Delete),
        allow: &[],
        denial: "Only admins can delete projects",
    },
    Grant {
        action: Action::Project(ProjectAction::AssignTeamLead),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can assign a team lead",
    },
    Grant {
        action: Action::Project(ProjectAction::AssignDesigner),
        allow: &[(Manager, ProjectManager), (TeamLead, ProjectTeamLead)],
        denial: "Only the project's manager or team lead can assign a designer",
    },
    Grant {
        action: Action::Project(ProjectAction::MarkDelivered),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can mark it delivered",
    },
    Grant {
        action: Action::Project(ProjectAction::SendToClient),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can send it to the client",
    },
    Grant {
        action: Action::Project(ProjectAction::ClientRequestsChanges),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can record client change requests",
    },
    Grant {
        action: Action::Project(ProjectAction::MarkCompleted),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can complete the project",
    },
    Grant {
        action: Action::Project(ProjectAction::Hold),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can put the project on hold",
    },
    Grant {
        action: Action::Project(ProjectAction::Resume),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can resume the project",
    },
    Grant {
        action: Action::Project(ProjectAction::Cancel),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can cancel the project",
    },
    // --- Requirement ---
    Grant {
        action: Action::Requirement(RequirementAction::Create),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can write requirements",
    },
    Grant {
        action: Action::Requirement(RequirementAction::Update),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can edit requirements",
    },
    Grant {
        action: Action::Requirement(RequirementAction::Approve),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can approve requirements",
    },
    // --- Task ---
    Grant {
        action: Action::Task(TaskAction::Create),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can create tasks",
    },
    Grant {
        action: Action::Task(TaskAction::Update),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can update tasks",
    },
    Grant {
        action: Action::Task(TaskAction::Delete),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can delete tasks",
    },
    Grant {
        action: Action::Task(TaskAction::Start),
        allow: &[(Developer, Assignee)],
        denial: "Only the assigned developer can start this task",
    },
    Grant {
        action: Action::Task(TaskAction::Submit),
        allow: &[(Developer, Assignee)],
        denial: "Only the assigned developer can submit this task",
    },
    Grant {
        action: Action::Task(TaskAction::Approve),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can approve tasks",
    },
    Grant {
        action: Action::Task(TaskAction::Reject),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can reject tasks",
    },
    // --- Design asset ---
    Grant {
        action: Action::Asset(AssetAction::Create),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can request design assets",
    },
    Grant {
        action: Action::Asset(AssetAction::Update),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can update design requests",
    },
    Grant {
        action: Action::Asset(AssetAction::Delete),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can delete design requests",
    },
    Grant {
        action: Action::Asset(AssetAction::Start),
        allow: &[(Designer, ProjectDesigner)],
        denial: "Only the project's designer can start this asset",
    },
    Grant {
        action: Action::Asset(AssetAction::Submit),
        allow: &[(Designer, ProjectDesigner)],
        denial: "Only the project's designer can submit this asset",
    },
    Grant {
        action: Action::Asset(AssetAction::Approve),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can approve assets",
    },
    Grant {
        action: Action::Asset(AssetAction::Reject),
        allow: &[(TeamLead, ProjectTeamLead)],
        denial: "Only the project's team lead can reject assets",
    },
    // --- Revision ---
    Grant {
        action: Action::Revision(RevisionAction::Create),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can create revisions",
    },
    Grant {
        action: Action::Revision(RevisionAction::AssignDeveloper),
        allow: &[(TeamLead, RevisionTeamLead)],
        denial: "Only the revision's team lead can assign a developer",
    },
    Grant {
        action: Action::Revision(RevisionAction::Start),
        allow: &[(Developer, Assignee)],
        denial: "Only the assigned developer can start this revision",
    },
    Grant {
        action: Action::Revision(RevisionAction::Submit),
        allow: &[(Developer, Assignee)],
        denial: "Only the assigned developer can submit this revision",
    },
    Grant {
        action: Action::Revision(RevisionAction::Complete),
        allow: &[(TeamLead, RevisionTeamLead)],
        denial: "Only the revision's team lead can complete it",
    },
    Grant {
        action: Action::Revision(RevisionAction::ManagerAccept),
        allow: &[(Manager, ProjectManager), (Manager, Creator)],
        denial: "Only the project's manager can accept revisions",
    },
    Grant {
        action: Action::Revision(RevisionAction::Delete),
        allow: &[(Manager, Creator)],
        denial: "Only the manager who created the revision can delete it",
    },
    // --- Project review ---
    Grant {
        action: Action::Review(ReviewAction::Create),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can review its developers",
    },
    Grant {
        action: Action::Review(ReviewAction::Update),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can edit reviews",
    },
    Grant {
        action: Action::Review(ReviewAction::Delete),
        allow: &[(Manager, ProjectManager)],
        denial: "Only the project's manager can delete reviews",
    },
];

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Decide whether `actor` may perform `action` on `subject`.
pub fn can_transition(actor: &Actor, subject: &Subject, action: Action) -> Decision {
    let Some(grant) = GRANTS.iter().find(|g| g.action == action) else {
        return Decision::Denied(format!("Unknown action {action}"));
    };

    if actor.is_admin() {
        return Decision::Allowed;
    }

    let allowed = grant
        .allow
        .iter()
        .any(|(role, relation)| *role == actor.role && relation.holds(actor.user_id, subject));

    if allowed {
        Decision::Allowed
    } else {
        Decision::Denied(grant.denial.to_string())
    }
}

/// [`can_transition`] as a `Result`, mapping denial to [`CoreError::Forbidden`].
pub fn authorize(actor: &Actor, subject: &Subject, action: Action) -> Result<(), CoreError> {
    match can_transition(actor, subject, action) {
        Decision::Allowed => Ok(()),
        Decision::Denied(reason) => Err(CoreError::Forbidden(reason)),
    }
}

/// Gate for operations outside the entity tables (accounts, automation).
pub fn require_admin(actor: &Actor, what: &str) -> Result<(), CoreError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!("Only admins can {what}")))
    }
}

/// One row of a permission-hint response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionHint {
    pub action: Action,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Dry-run every action of `kind` against `subject`.
pub fn hints(actor: &Actor, subject: &Subject, kind: EntityKind) -> Vec<PermissionHint> {
    Action::for_entity(kind)
        .into_iter()
        .map(|action| PermissionHint {
            action,
            decision: can_transition(actor, subject, action),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANAGER: DbId = 10;
    const LEAD: DbId = 20;
    const DEV: DbId = 30;
    const DESIGNER: DbId = 40;

    fn scope() -> ProjectScope {
        ProjectScope {
            manager_id: MANAGER,
            team_lead_id: Some(LEAD),
            designer_id: Some(DESIGNER),
        }
    }

    #[test]
    fn task_update_requires_project_team_lead() {
        let subject = Subject::project(scope()).with_assignee(Some(DEV));
        let lead = Actor::new(LEAD, Role::TeamLead);
        let other_lead = Actor::new(99, Role::TeamLead);
        let action = Action::Task(TaskAction::Update);

        assert!(can_transition(&lead, &subject, action).is_allowed());
        assert_eq!(
            can_transition(&other_lead, &subject, action),
            Decision::Denied("Only the project's team lead can update tasks".into())
        );
    }

    #[test]
    fn admin_bypasses_ownership() {
        let subject = Subject::project(scope());
        let admin = Actor::new(1, Role::Admin);
        for grant in GRANTS {
            assert!(can_transition(&admin, &subject, grant.action).is_allowed());
        }
    }

    #[test]
    fn role_must_match_as_well_as_relation() {
        // The developer id happens to be the team lead's id on paper, but the
        // role does not grant approval.
        let subject = Subject::project(ProjectScope {
            team_lead_id: Some(DEV),
            ..scope()
        });
        let dev = Actor::new(DEV, Role::Developer);
        assert!(!can_transition(&dev, &subject, Action::Task(TaskAction::Approve)).is_allowed());
    }

    #[test]
    fn only_assignee_submits_work() {
        let subject = Subject::project(scope()).with_assignee(Some(DEV));
        let dev = Actor::new(DEV, Role::Developer);
        let other = Actor::new(31, Role::Developer);
        assert!(authorize(&dev, &subject, Action::Task(TaskAction::Submit)).is_ok());
        assert!(matches!(
            authorize(&other, &subject, Action::Task(TaskAction::Submit)),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn revision_team_lead_prefers_copied_lead() {
        let subject = Subject::project(scope()).with_team_lead(Some(21));
        let copied = Actor::new(21, Role::TeamLead);
        let project_lead = Actor::new(LEAD, Role::TeamLead);
        let action = Action::Revision(RevisionAction::AssignDeveloper);
        assert!(can_transition(&copied, &subject, action).is_allowed());
        assert!(!can_transition(&project_lead, &subject, action).is_allowed());

        let unassigned = Subject::project(scope());
        assert!(can_transition(&project_lead, &unassigned, action).is_allowed());
    }

    #[test]
    fn designer_works_assets_lead_approves() {
        let subject = Subject::project(scope());
        let designer = Actor::new(DESIGNER, Role::Designer);
        let lead = Actor::new(LEAD, Role::TeamLead);
        assert!(can_transition(&designer, &subject, Action::Asset(AssetAction::Submit)).is_allowed());
        assert!(!can_transition(&designer, &subject, Action::Asset(AssetAction::Approve)).is_allowed());
        assert!(can_transition(&lead, &subject, Action::Asset(AssetAction::Approve)).is_allowed());
    }

    #[test]
    fn project_creation_is_admin_only() {
        let manager = Actor::new(MANAGER, Role::Manager);
        let decision = can_transition(
            &manager,
            &Subject::default(),
            Action::Project(ProjectAction::Create),
        );
        assert_eq!(decision, Decision::Denied("Only admins can create projects".into()));
    }

    #[test]
    fn hints_cover_every_action_of_the_entity() {
        let subject = Subject::project(scope()).with_assignee(Some(DEV));
        let dev = Actor::new(DEV, Role::Developer);
        let hints = hints(&dev, &subject, EntityKind::Task);
        assert_eq!(hints.len(), TaskAction::ALL.len());
        let allowed: Vec<_> = hints
            .iter()
            .filter(|h| h.decision.is_allowed())
            .map(|h| h.action.to_string())
            .collect();
        assert_eq!(allowed, vec!["task.start", "task.submit"]);
    }

    #[test]
    fn every_action_enum_has_a_grant() {
        for a in ProjectAction::ALL {
            assert!(GRANTS.iter().any(|g| g.action == Action::Project(*a)), "{a}");
        }
        for a in TaskAction::ALL {
            assert!(GRANTS.iter().any(|g| g.action == Action::Task(*a)), "{a}");
        }
        for a in AssetAction::ALL {
            assert!(GRANTS.iter().any(|g| g.action == Action::Asset(*a)), "{a}");
        }
        for a in RevisionAction::ALL {
            assert!(GRANTS.iter().any(|g| g.action == Action::Revision(*a)), "{a}");
        }
        for a in RequirementAction::ALL {
            assert!(GRANTS.iter().any(|g| g.action == Action::Requirement(*a)), "{a}");
        }
    }

    #[test]
    fn decision_serializes_for_hints() {
        let json = serde_json::to_value(Decision::Denied("nope".into())).unwrap();
        assert_eq!(json, serde_json::json!({"decision": "denied", "reason": "nope"}));
    }
}
