//! The `X-API-Key` automation surface.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp, AUTOMATION_KEY};
use serde_json::json;

#[tokio::test]
async fn missing_api_key_returns_401() {
    let app = TestApp::new().await;
    let response = app
        .automation(Method::GET, "/api/v1/automation/idle-projects", None, None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Missing X-API-Key header");
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let app = TestApp::new().await;
    let response = app
        .automation(
            Method::GET,
            "/api/v1/automation/idle-projects",
            Some("guessed-key"),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid API key");
}

#[tokio::test]
async fn bearer_tokens_do_not_open_the_automation_surface() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/v1/automation/weekly-summary", &app.admin)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_automation_is_forbidden() {
    let app = TestApp::with_automation(false).await;
    let response = app
        .automation(
            Method::GET,
            "/api/v1/automation/idle-projects",
            Some(AUTOMATION_KEY),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "Automation access is not configured"
    );
}

#[tokio::test]
async fn read_endpoints_return_data() {
    let app = TestApp::new().await;
    app.staffed_project().await;

    for uri in [
        "/api/v1/automation/idle-projects",
        "/api/v1/automation/overdue-tasks",
        "/api/v1/automation/pending-reviews",
    ] {
        let response = app
            .automation(Method::GET, uri, Some(AUTOMATION_KEY), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert!(body_json(response).await["data"].is_array(), "{uri}");
    }

    let response = app
        .automation(
            Method::GET,
            "/api/v1/automation/weekly-summary",
            Some(AUTOMATION_KEY),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["projects_created"], 1);
    assert_eq!(json["data"]["active_projects"], 1);
}

#[tokio::test]
async fn status_update_holds_and_resumes_a_project() {
    let app = TestApp::new().await;
    let project_id = app.staffed_project().await;

    let response = app
        .automation(
            Method::POST,
            "/api/v1/automation/project-status-update",
            Some(AUTOMATION_KEY),
            Some(json!({ "project_id": project_id, "status": "ON_HOLD" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "ON_HOLD");

    let response = app
        .automation(
            Method::POST,
            "/api/v1/automation/project-status-update",
            Some(AUTOMATION_KEY),
            Some(json!({ "project_id": project_id, "status": "IN_PROGRESS" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn requirement_driven_statuses_cannot_be_set() {
    let app = TestApp::new().await;
    let project_id = app.staffed_project().await;

    let response = app
        .automation(
            Method::POST,
            "/api/v1/automation/project-status-update",
            Some(AUTOMATION_KEY),
            Some(json!({ "project_id": project_id, "status": "NEW" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn reminder_needs_exactly_one_recipient_selector() {
    let app = TestApp::new().await;

    let response = app
        .automation(
            Method::POST,
            "/api/v1/automation/send-reminder",
            Some(AUTOMATION_KEY),
            Some(json!({
                "user_ids": [app.dev.user_id],
                "role": "DEVELOPER",
                "title": "Standup",
                "message": "Post your update",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = app
        .automation(
            Method::POST,
            "/api/v1/automation/send-reminder",
            Some(AUTOMATION_KEY),
            Some(json!({ "title": "Standup", "message": "Post your update" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reminder_by_role_reaches_every_active_user_with_it() {
    let app = TestApp::new().await;

    let response = app
        .automation(
            Method::POST,
            "/api/v1/automation/send-reminder",
            Some(AUTOMATION_KEY),
            Some(json!({
                "role": "DEVELOPER",
                "title": "Timesheets",
                "message": "Submit by Friday",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["notifications"], 1);
    assert_eq!(json["data"]["failed_notifications"], 0);

    let json = body_json(app.get("/api/v1/notifications", &app.dev).await).await;
    let notifications = json["data"].as_array().unwrap();
    assert!(notifications
        .iter()
        .any(|n| n["type"] == "REMINDER" && n["title"] == "Timesheets"));
}

#[tokio::test]
async fn reminder_to_unknown_users_is_reported_as_failed() {
    let app = TestApp::new().await;

    let response = app
        .automation(
            Method::POST,
            "/api/v1/automation/send-reminder",
            Some(AUTOMATION_KEY),
            Some(json!({
                "user_ids": [app.dev.user_id, 9999],
                "title": "Heads up",
                "message": "Deploy freeze tonight",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["notifications"], 1);
    assert_eq!(json["data"]["failed_notifications"], 1);
}
