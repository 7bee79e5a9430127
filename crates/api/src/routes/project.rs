//! Route definitions for `/projects` and everything nested under a project.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{assets, projects, requirements, revisions, reviews, tasks};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                              -> list_projects
/// POST   /                              -> create_project
/// GET    /{id}                          -> get_project
/// PUT    /{id}                          -> update_project
/// DELETE /{id}                          -> delete_project
///
/// PUT    /{id}/team-lead                -> assign_team_lead
/// PUT    /{id}/designer                 -> assign_designer
///
/// POST   /{id}/deliver                  -> mark_delivered
/// POST   /{id}/send-to-client           -> send_to_client
/// POST   /{id}/request-changes          -> client_requests_changes
/// POST   /{id}/complete                 -> mark_completed
/// POST   /{id}/hold                     -> hold_project
/// POST   /{id}/resume                   -> resume_project
/// POST   /{id}/cancel                   -> cancel_project
///
/// GET    /{id}/requirements             -> list_requirements
/// POST   /{id}/requirements             -> create_requirement
/// GET    /{id}/tasks                    -> list_project_tasks
/// POST   /{id}/tasks                    -> create_task
/// GET    /{id}/assets                   -> list_assets
/// POST   /{id}/assets                   -> request_asset
/// GET    /{id}/revisions                -> list_revisions
/// POST   /{id}/revisions                -> create_revision
/// GET    /{id}/revisions/suggestions    -> suggest_developers
/// POST   /{id}/reviews                  -> create_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route(
            "/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Staffing
        .route("/{id}/team-lead", put(projects::assign_team_lead))
        .route("/{id}/designer", put(projects::assign_designer))
        // Lifecycle
        .route("/{id}/deliver", post(projects::mark_delivered))
        .route("/{id}/send-to-client", post(projects::send_to_client))
        .route("/{id}/request-changes", post(projects::client_requests_changes))
        .route("/{id}/complete", post(projects::mark_completed))
        .route("/{id}/hold", post(projects::hold_project))
        .route("/{id}/resume", post(projects::resume_project))
        .route("/{id}/cancel", post(projects::cancel_project))
        // Children
        .route(
            "/{id}/requirements",
            get(requirements::list_requirements).post(requirements::create_requirement),
        )
        .route(
            "/{id}/tasks",
            get(tasks::list_project_tasks).post(tasks::create_task),
        )
        .route(
            "/{id}/assets",
            get(assets::list_assets).post(assets::request_asset),
        )
        .route(
            "/{id}/revisions",
            get(revisions::list_revisions).post(revisions::create_revision),
        )
        .route(
            "/{id}/revisions/suggestions",
            get(revisions::suggest_developers),
        )
        .route("/{id}/reviews", post(reviews::create_review))
}

/// Routes mounted at `/fiverr-accounts`.
pub fn fiverr_account_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(projects::list_fiverr_accounts).post(projects::create_fiverr_account),
    )
}
