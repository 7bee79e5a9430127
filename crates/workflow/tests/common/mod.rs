#![allow(dead_code)]

use std::sync::Arc;

use agency_core::project::{ProjectComplexity, ProjectPriority};
use agency_core::roles::{Actor, Role, UserStatus};
use agency_core::types::DbId;
use agency_db::models::fiverr_account::NewFiverrAccount;
use agency_db::models::notification::{Notification, NotificationQuery};
use agency_db::models::project::{NewProject, Project};
use agency_db::models::task::Task;
use agency_db::models::user::NewUser;
use agency_db::{EntityStore, MemoryStore};
use agency_events::EventBus;
use agency_workflow::tasks::{CreateTask, TaskSubmission};
use agency_workflow::{Workflow, WorkflowSettings};

/// A workflow service over a fresh in-memory store with one user per role
/// and three developers.
pub struct Harness {
    pub workflow: Workflow,
    pub store: MemoryStore,
    pub bus: Arc<EventBus>,
    pub admin: Actor,
    pub manager: Actor,
    pub lead: Actor,
    pub designer: Actor,
    pub devs: Vec<Actor>,
    pub account_id: DbId,
}

impl Harness {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let bus = Arc::new(EventBus::new(256));
        let workflow = Workflow::new(
            Arc::new(store.clone()),
            Arc::clone(&bus),
            WorkflowSettings::default(),
        );

        let account_id = {
            let mut tx = store.begin().await.unwrap();
            let account = tx
                .insert_fiverr_account(&NewFiverrAccount {
                    name: "studio-main".to_string(),
                })
                .await
                .unwrap();
            tx.commit().await.unwrap();
            account.id
        };

        let mut harness = Self {
            workflow,
            store,
            bus,
            admin: Actor::new(0, Role::Admin),
            manager: Actor::new(0, Role::Manager),
            lead: Actor::new(0, Role::TeamLead),
            designer: Actor::new(0, Role::Designer),
            devs: Vec::new(),
            account_id,
        };
        harness.admin = harness.user("admin", Role::Admin).await;
        harness.manager = harness.user("manager", Role::Manager).await;
        harness.lead = harness.user("lead", Role::TeamLead).await;
        harness.designer = harness.user("designer", Role::Designer).await;
        for i in 1..=3 {
            let dev = harness.user(&format!("dev{i}"), Role::Developer).await;
            harness.devs.push(dev);
        }
        harness
    }

    pub async fn user(&self, name: &str, role: Role) -> Actor {
        self.user_with_status(name, role, UserStatus::Active).await
    }

    pub async fn user_with_status(&self, name: &str, role: Role, status: UserStatus) -> Actor {
        let mut tx = self.store.begin().await.unwrap();
        let user = tx
            .insert_user(&NewUser {
                email: format!("{name}@agency.test"),
                name: name.to_string(),
                role,
                status,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        Actor::new(user.id, role)
    }

    /// A NEW project managed by `self.manager`.
    pub async fn project(&self) -> Project {
        self.workflow
            .create_project(
                &self.admin,
                NewProject {
                    internal_name: "Storefront redesign".to_string(),
                    client_name: Some("Acme".to_string()),
                    fiverr_account_id: self.account_id,
                    fiverr_order_id: None,
                    priority: ProjectPriority::High,
                    complexity: ProjectComplexity::Medium,
                    manager_id: self.manager.user_id,
                    budget_cents: Some(150_000),
                    deadline: None,
                    internal_deadline: None,
                },
            )
            .await
            .unwrap()
    }

    /// An IN_PROGRESS project with the team lead and designer assigned.
    pub async fn staffed_project(&self) -> Project {
        let project = self.project().await;
        self.workflow
            .assign_team_lead(&self.manager, project.id, self.lead.user_id)
            .await
            .unwrap();
        self.workflow
            .assign_designer(&self.manager, project.id, self.designer.user_id)
            .await
            .unwrap()
    }

    pub async fn task(&self, project_id: DbId, dev: &Actor) -> Task {
        self.workflow
            .create_task(
                &self.lead,
                project_id,
                CreateTask {
                    title: format!("Task for {}", dev.user_id),
                    description: None,
                    assigned_to_id: dev.user_id,
                    priority: 5,
                    due_date: None,
                },
            )
            .await
            .unwrap()
    }

    /// Drive a task from ASSIGNED to SUBMITTED as its developer.
    pub async fn submitted_task(&self, project_id: DbId, dev: &Actor) -> Task {
        let task = self.task(project_id, dev).await;
        self.workflow.start_task(dev, task.id).await.unwrap();
        self.workflow
            .submit_task(dev, task.id, TaskSubmission::default())
            .await
            .unwrap()
    }

    /// A COMPLETED project with one approved task per given developer.
    pub async fn completed_project(&self, devs: &[Actor]) -> Project {
        let project = self.staffed_project().await;
        for dev in devs {
            let task = self.submitted_task(project.id, dev).await;
            self.workflow.approve_task(&self.lead, task.id).await.unwrap();
        }
        self.workflow
            .send_to_client(&self.manager, project.id)
            .await
            .unwrap();
        self.workflow
            .mark_completed(&self.manager, project.id)
            .await
            .unwrap()
    }

    pub async fn notifications(&self, actor: &Actor) -> Vec<Notification> {
        self.workflow
            .list_notifications(actor, NotificationQuery::default())
            .await
            .unwrap()
    }

    pub async fn project_status(&self, id: DbId) -> agency_core::project::ProjectStatus {
        self.workflow.get_project(&self.admin, id).await.unwrap().status
    }
}
