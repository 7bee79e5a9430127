pub mod asset;
pub mod automation;
pub mod health;
pub mod notification;
pub mod project;
pub mod requirement;
pub mod review;
pub mod revision;
pub mod task;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                   realtime gateway (token or Bearer)
///
/// /projects                             projects and their children
/// /fiverr-accounts                      list, create
/// /requirements/{id}                    update, approve
/// /tasks                                own tasks, task transitions
/// /assets/{id}                          asset transitions
/// /revisions                            queues, revision transitions
/// /reviews                              list, update, delete
/// /developers/{id}/tier/recalculate     admin tier recalculation
/// /notifications                        own notifications
/// /permissions/{entity}/{id}            policy dry-run hints
/// /users/{id}/presence                  realtime presence
///
/// /automation                           API-key authenticated surface
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/projects", project::router())
        .nest("/fiverr-accounts", project::fiverr_account_router())
        .nest("/requirements", requirement::router())
        .nest("/tasks", task::router())
        .nest("/assets", asset::router())
        .nest("/revisions", revision::router())
        .nest("/reviews", review::router())
        .nest("/developers", review::developer_router())
        .nest("/notifications", notification::router())
        .route(
            "/permissions/{entity}/{id}",
            get(handlers::permissions::permission_hints),
        )
        .route(
            "/users/{id}/presence",
            get(handlers::presence::get_presence),
        )
        .nest("/automation", automation::router())
}
