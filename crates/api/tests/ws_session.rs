//! WebSocket handshake credentials and client frames over a live app state.

mod common;

use agency_api::middleware::auth::AuthUser;
use agency_api::ws::{authenticate_upgrade, handle_frame, CLOSE_UNAUTHORIZED};
use agency_core::channels::Channel;
use agency_core::roles::Actor;
use axum::extract::ws::Message;
use common::{sign_token, TestApp};

fn auth(actor: &Actor) -> AuthUser {
    AuthUser {
        user_id: actor.user_id,
        role: actor.role,
    }
}

async fn reach(app: &TestApp, project_id: i64) -> usize {
    app.state
        .ws_manager
        .send_to_channel(Channel::Project(project_id), Message::Text("ping".into()))
        .await
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_or_invalid_tokens_get_the_unauthorized_close_frame() {
    let app = TestApp::new().await;

    for token in [None, Some("not-a-jwt"), Some("")] {
        let frame = authenticate_upgrade(token, &app.state).unwrap_err();
        assert_eq!(frame.code, CLOSE_UNAUTHORIZED, "{token:?}");
        assert_eq!(frame.code, 4401);
        assert_eq!(frame.reason.as_str(), "Invalid or expired token");
    }
}

#[tokio::test]
async fn expired_token_gets_the_unauthorized_close_frame() {
    let app = TestApp::new().await;
    let token = sign_token(&app.lead, &app.state.config.jwt, -600);

    let frame = authenticate_upgrade(Some(token.as_str()), &app.state).unwrap_err();
    assert_eq!(frame.code, CLOSE_UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_yields_the_session_identity() {
    let app = TestApp::new().await;
    let token = app.token(&app.lead);

    let user = authenticate_upgrade(Some(token.as_str()), &app.state).unwrap();
    assert_eq!(user.user_id, app.lead.user_id);
    assert_eq!(user.role, app.lead.role);
}

// ---------------------------------------------------------------------------
// Client frames
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscribing_to_an_invisible_project_is_refused() {
    let app = TestApp::new().await;
    let project_id = app.staffed_project().await;
    let _rx = app.state.ws_manager.add("conn-dev".into(), app.dev.user_id).await;

    let frame = format!(r#"{{"type":"subscribe","project_id":{project_id}}}"#);
    let reply = handle_frame(&app.state, "conn-dev", auth(&app.dev), &frame).await;

    assert_eq!(reply["type"], "error");
    assert_eq!(reply["project_id"], project_id);
    assert!(reply["message"].is_string());
    assert_eq!(reach(&app, project_id).await, 0);
}

#[tokio::test]
async fn subscribing_to_an_unknown_project_is_refused() {
    let app = TestApp::new().await;
    let _rx = app.state.ws_manager.add("conn-admin".into(), app.admin.user_id).await;

    let reply = handle_frame(
        &app.state,
        "conn-admin",
        auth(&app.admin),
        r#"{"type":"subscribe","project_id":9999}"#,
    )
    .await;

    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Project with id 9999 not found");
    assert_eq!(reach(&app, 9999).await, 0);
}

#[tokio::test]
async fn visible_project_can_be_joined_and_left() {
    let app = TestApp::new().await;
    let project_id = app.staffed_project().await;
    let mut rx = app.state.ws_manager.add("conn-lead".into(), app.lead.user_id).await;

    let join = format!(r#"{{"type":"subscribe","project_id":{project_id}}}"#);
    let reply = handle_frame(&app.state, "conn-lead", auth(&app.lead), &join).await;
    assert_eq!(reply["type"], "subscribed");
    assert_eq!(reply["channel"], format!("project:{project_id}"));
    assert_eq!(reach(&app, project_id).await, 1);
    assert!(matches!(rx.recv().await, Some(Message::Text(_))));

    let leave = format!(r#"{{"type":"unsubscribe","project_id":{project_id}}}"#);
    let reply = handle_frame(&app.state, "conn-lead", auth(&app.lead), &leave).await;
    assert_eq!(reply["type"], "unsubscribed");
    assert_eq!(reach(&app, project_id).await, 0);
}

#[tokio::test]
async fn malformed_frames_are_answered_with_an_error() {
    let app = TestApp::new().await;
    let _rx = app.state.ws_manager.add("conn-dev".into(), app.dev.user_id).await;

    let reply = handle_frame(&app.state, "conn-dev", auth(&app.dev), r#"{"type":"shout"}"#).await;

    assert_eq!(reply["type"], "error");
    assert!(reply["message"]
        .as_str()
        .unwrap()
        .starts_with("Unrecognized frame"));
}
