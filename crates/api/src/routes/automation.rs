//! Route definitions for the automation surface (`X-API-Key`, not bearer).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::automation;
use crate::state::AppState;

/// Routes mounted at `/automation`.
///
/// ```text
/// GET    /idle-projects            -> idle_projects
/// GET    /overdue-tasks            -> overdue_tasks
/// GET    /pending-reviews          -> pending_reviews
/// GET    /weekly-summary           -> weekly_summary
/// POST   /project-status-update    -> project_status_update
/// POST   /send-reminder            -> send_reminder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/idle-projects", get(automation::idle_projects))
        .route("/overdue-tasks", get(automation::overdue_tasks))
        .route("/pending-reviews", get(automation::pending_reviews))
        .route("/weekly-summary", get(automation::weekly_summary))
        .route(
            "/project-status-update",
            post(automation::project_status_update),
        )
        .route("/send-reminder", post(automation::send_reminder))
}
