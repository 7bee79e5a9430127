//! Project, requirement, task and design-asset transitions end to end.

mod common;

use agency_core::channels::{Channel, EventName};
use agency_core::effects::NotificationKind;
use agency_core::error::CoreError;
use agency_core::project::ProjectStatus;
use agency_core::requirement::RequirementStatus;
use agency_core::roles::{Role, UserStatus};
use agency_core::task::TaskStatus;
use agency_db::models::project::UpdateProject;
use agency_db::models::task::TaskFilter;
use agency_workflow::assets::RequestAsset;
use agency_workflow::tasks::CreateTask;
use agency_workflow::WorkflowError;
use assert_matches::assert_matches;
use common::Harness;

fn core(err: WorkflowError) -> CoreError {
    err.into_core()
}

// ---------------------------------------------------------------------------
// Project status derivation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requirements_drive_the_early_statuses() {
    let h = Harness::new().await;
    let project = h.project().await;
    assert_eq!(project.status, ProjectStatus::New);

    let first = h
        .workflow
        .create_requirement(&h.manager, project.id, "Five pages".into())
        .await
        .unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(h.project_status(project.id).await, ProjectStatus::RequirementsPending);

    let second = h
        .workflow
        .create_requirement(&h.manager, project.id, "Six pages".into())
        .await
        .unwrap();
    assert_eq!(second.version, 2);

    let approved = h.workflow.approve_requirement(&h.manager, second.id).await.unwrap();
    assert_eq!(approved.status, RequirementStatus::Approved);
    assert_eq!(approved.approved_by_id, Some(h.manager.user_id));
    assert_eq!(h.project_status(project.id).await, ProjectStatus::InProgress);
}

#[tokio::test]
async fn approved_requirements_are_immutable() {
    let h = Harness::new().await;
    let project = h.project().await;
    let req = h
        .workflow
        .create_requirement(&h.manager, project.id, "Draft".into())
        .await
        .unwrap();
    h.workflow.approve_requirement(&h.manager, req.id).await.unwrap();

    let err = h
        .workflow
        .update_requirement(&h.manager, req.id, "Edited".into())
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(msg) if msg.contains("create a new version"));
}

#[tokio::test]
async fn assigning_a_team_lead_starts_the_build() {
    let h = Harness::new().await;
    let project = h.project().await;
    let project = h
        .workflow
        .assign_team_lead(&h.manager, project.id, h.lead.user_id)
        .await
        .unwrap();
    assert_eq!(project.status, ProjectStatus::InProgress);
    assert_eq!(project.team_lead_id, Some(h.lead.user_id));

    let kinds: Vec<_> = h
        .notifications(&h.lead)
        .await
        .into_iter()
        .map(|n| n.notification_type)
        .collect();
    assert_eq!(kinds, vec![NotificationKind::ProjectAssigned]);
}

#[tokio::test]
async fn team_lead_must_be_an_active_team_lead() {
    let h = Harness::new().await;
    let project = h.project().await;
    let suspended = h
        .user_with_status("old-lead", Role::TeamLead, UserStatus::Suspended)
        .await;

    let err = h
        .workflow
        .assign_team_lead(&h.manager, project.id, h.devs[0].user_id)
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::Validation(_));

    let err = h
        .workflow
        .assign_team_lead(&h.manager, project.id, suspended.user_id)
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::Validation(msg) if msg.contains("not active"));
}

#[tokio::test]
async fn third_approval_promotes_project_to_review() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let mut tasks = Vec::new();
    for dev in &h.devs {
        tasks.push(h.submitted_task(project.id, dev).await);
    }

    h.workflow.approve_task(&h.lead, tasks[0].id).await.unwrap();
    h.workflow.approve_task(&h.lead, tasks[1].id).await.unwrap();
    assert_eq!(h.project_status(project.id).await, ProjectStatus::InProgress);

    h.workflow.approve_task(&h.lead, tasks[2].id).await.unwrap();
    assert_eq!(h.project_status(project.id).await, ProjectStatus::Review);

    let ready: Vec<_> = h
        .notifications(&h.manager)
        .await
        .into_iter()
        .filter(|n| n.notification_type == NotificationKind::ProjectReadyForReview)
        .collect();
    assert_eq!(ready.len(), 1);

    // Re-approving is an illegal transition, so there is no second promotion.
    let err = h.workflow.approve_task(&h.lead, tasks[2].id).await.unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(_));
}

#[tokio::test]
async fn approve_requires_a_submitted_task() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let task = h.task(project.id, &h.devs[0]).await;

    let err = h.workflow.approve_task(&h.lead, task.id).await.unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(msg) if msg.contains("submitted"));
}

#[tokio::test]
async fn rejected_task_can_be_resubmitted_directly() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let dev = &h.devs[0];
    let task = h.submitted_task(project.id, dev).await;

    let err = h
        .workflow
        .reject_task(&h.lead, task.id, "  ".into())
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::Validation(_));

    let rejected = h
        .workflow
        .reject_task(&h.lead, task.id, "Broken layout".into())
        .await
        .unwrap();
    assert_eq!(rejected.status, TaskStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Broken layout"));

    let resubmitted = h
        .workflow
        .submit_task(dev, task.id, Default::default())
        .await
        .unwrap();
    assert_eq!(resubmitted.status, TaskStatus::Submitted);
}

#[tokio::test]
async fn approved_tasks_cannot_be_deleted() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let task = h.submitted_task(project.id, &h.devs[0]).await;
    h.workflow.approve_task(&h.lead, task.id).await.unwrap();

    let err = h.workflow.delete_task(&h.lead, task.id).await.unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(_));
}

#[tokio::test]
async fn task_priority_is_bounded() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let err = h
        .workflow
        .create_task(
            &h.lead,
            project.id,
            CreateTask {
                title: "Hero".into(),
                description: None,
                assigned_to_id: h.devs[0].user_id,
                priority: 11,
                due_date: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::Validation(_));
}

#[tokio::test]
async fn mark_delivered_needs_tasks() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;

    let err = h.workflow.mark_delivered(&h.lead, project.id).await.unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(msg) if msg.contains("no tasks"));
}

#[tokio::test]
async fn send_to_client_explains_the_blocking_rule() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;

    let err = h.workflow.send_to_client(&h.manager, project.id).await.unwrap_err();
    assert_matches!(
        core(err),
        CoreError::InvalidState(msg) if msg == "Only projects in review can be sent to the client"
    );
}

#[tokio::test]
async fn hold_and_resume_round_trip() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;

    let held = h.workflow.hold_project(&h.manager, project.id).await.unwrap();
    assert_eq!(held.status, ProjectStatus::OnHold);
    let resumed = h.workflow.resume_project(&h.manager, project.id).await.unwrap();
    assert_eq!(resumed.status, ProjectStatus::InProgress);

    let cancelled = h.workflow.cancel_project(&h.manager, project.id).await.unwrap();
    assert_eq!(cancelled.status, ProjectStatus::Cancelled);
    let err = h
        .workflow
        .update_project(&h.manager, project.id, UpdateProject::default())
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(_));
}

#[tokio::test]
async fn completion_is_published_to_each_active_admin() {
    let h = Harness::new().await;
    let second_admin = h.user("second-admin", Role::Admin).await;
    let suspended = h.user_with_status("old-admin", Role::Admin, UserStatus::Suspended).await;
    let project = h.staffed_project().await;
    let task = h.submitted_task(project.id, &h.devs[0]).await;
    h.workflow.approve_task(&h.lead, task.id).await.unwrap();
    h.workflow.send_to_client(&h.manager, project.id).await.unwrap();

    let mut events = h.bus.subscribe();
    h.workflow.mark_completed(&h.manager, project.id).await.unwrap();

    let mut completed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if event.event == EventName::ProjectCompleted {
            assert_eq!(event.payload["project_id"], project.id);
            completed.push(event.channel);
        }
    }
    assert!(completed.contains(&Channel::Project(project.id)));
    assert!(completed.contains(&Channel::User(h.admin.user_id)));
    assert!(completed.contains(&Channel::User(second_admin.user_id)));
    assert!(!completed.contains(&Channel::User(suspended.user_id)));
    assert!(!completed.contains(&Channel::User(h.manager.user_id)));
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn denials_name_the_missing_relation() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let task = h.submitted_task(project.id, &h.devs[0]).await;

    let err = h.workflow.approve_task(&h.devs[0], task.id).await.unwrap_err();
    assert_matches!(
        core(err),
        CoreError::Forbidden(msg) if msg == "Only the project's team lead can approve tasks"
    );

    let other_manager = h.user("other-manager", Role::Manager).await;
    let err = h
        .workflow
        .hold_project(&other_manager, project.id)
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::Forbidden(_));

    let err = h.workflow.start_task(&h.devs[1], task.id).await.unwrap_err();
    assert_matches!(core(err), CoreError::Forbidden(msg) if msg.contains("assigned developer"));
}

#[tokio::test]
async fn admin_bypasses_ownership() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let task = h.submitted_task(project.id, &h.devs[0]).await;

    let approved = h.workflow.approve_task(&h.admin, task.id).await.unwrap();
    assert_eq!(approved.status, TaskStatus::Approved);
}

#[tokio::test]
async fn fiverr_accounts_are_admin_only_and_unique() {
    let h = Harness::new().await;
    let err = h
        .workflow
        .create_fiverr_account(&h.manager, agency_db::models::fiverr_account::NewFiverrAccount {
            name: "side".into(),
        })
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::Forbidden(_));

    let err = h
        .workflow
        .create_fiverr_account(&h.admin, agency_db::models::fiverr_account::NewFiverrAccount {
            name: "studio-main".into(),
        })
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::Conflict(_));
}

#[tokio::test]
async fn developers_only_see_projects_they_work_on() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    let _other = h.staffed_project().await;
    h.task(project.id, &h.devs[0]).await;

    let visible = h
        .workflow
        .list_projects(&h.devs[0], &Default::default())
        .await
        .unwrap();
    assert_eq!(visible.iter().map(|p| p.id).collect::<Vec<_>>(), vec![project.id]);

    let err = h.workflow.get_project(&h.devs[1], project.id).await.unwrap_err();
    assert_matches!(core(err), CoreError::Forbidden(_));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let h = Harness::new().await;
    let err = h.workflow.approve_task(&h.lead, 9_999).await.unwrap_err();
    assert_matches!(core(err), CoreError::NotFound { entity: "Task", id: 9_999 });
}

// ---------------------------------------------------------------------------
// Design assets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn asset_request_needs_a_designer() {
    let h = Harness::new().await;
    let project = h.project().await;
    h.workflow
        .assign_team_lead(&h.manager, project.id, h.lead.user_id)
        .await
        .unwrap();

    let err = h
        .workflow
        .request_asset(
            &h.lead,
            project.id,
            RequestAsset {
                title: "Logo".into(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(msg) if msg.contains("designer"));
}

#[tokio::test]
async fn asset_approval_reaches_each_developer_once() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    h.task(project.id, &h.devs[0]).await;
    h.task(project.id, &h.devs[0]).await;
    h.task(project.id, &h.devs[1]).await;

    let asset = h
        .workflow
        .request_asset(
            &h.lead,
            project.id,
            RequestAsset {
                title: "Logo".into(),
                description: Some("SVG".into()),
            },
        )
        .await
        .unwrap();
    h.workflow
        .submit_asset(&h.designer, asset.id, "https://cdn.test/logo.svg".into())
        .await
        .unwrap();

    let mut events = h.bus.subscribe();
    let approved = h.workflow.approve_asset(&h.lead, asset.id).await.unwrap();
    assert_eq!(approved.approved_by_id, Some(h.lead.user_id));

    let count = |notes: Vec<agency_db::models::notification::Notification>| {
        notes
            .into_iter()
            .filter(|n| n.notification_type == NotificationKind::AssetApproved)
            .count()
    };
    assert_eq!(count(h.notifications(&h.devs[0]).await), 1);
    assert_eq!(count(h.notifications(&h.devs[1]).await), 1);
    assert_eq!(count(h.notifications(&h.devs[2]).await), 0);
    assert_eq!(count(h.notifications(&h.designer).await), 1);

    let mut saw_approved = false;
    while let Ok(event) = events.try_recv() {
        if event.event == EventName::AssetApproved {
            assert_eq!(event.channel, Channel::Project(project.id));
            saw_approved = true;
        }
    }
    assert!(saw_approved);

    let err = h.workflow.delete_asset(&h.lead, asset.id).await.unwrap_err();
    assert_matches!(core(err), CoreError::InvalidState(_));
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_a_project_removes_its_children() {
    let h = Harness::new().await;
    let project = h.staffed_project().await;
    h.task(project.id, &h.devs[0]).await;

    h.workflow.delete_project(&h.admin, project.id).await.unwrap();

    let tasks = h
        .workflow
        .list_tasks(&h.admin, &TaskFilter::default())
        .await
        .unwrap();
    assert!(tasks.is_empty());
    let err = h.workflow.get_project(&h.admin, project.id).await.unwrap_err();
    assert_matches!(core(err), CoreError::NotFound { .. });
}
