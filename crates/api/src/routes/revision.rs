use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::revisions;
use crate::state::AppState;

/// Routes mounted at `/revisions`.
///
/// ```text
/// GET    /queue/{queue}     -> revision_queue
/// GET    /{id}              -> get_revision
/// DELETE /{id}              -> delete_revision
/// PUT    /{id}/developer    -> assign_developer
/// POST   /{id}/start        -> start_revision
/// POST   /{id}/submit       -> submit_revision
/// POST   /{id}/complete     -> complete_revision
/// POST   /{id}/accept       -> accept_revision
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue/{queue}", get(revisions::revision_queue))
        .route(
            "/{id}",
            get(revisions::get_revision).delete(revisions::delete_revision),
        )
        .route("/{id}/developer", put(revisions::assign_developer))
        .route("/{id}/start", post(revisions::start_revision))
        .route("/{id}/submit", post(revisions::submit_revision))
        .route("/{id}/complete", post(revisions::complete_revision))
        .route("/{id}/accept", post(revisions::accept_revision))
}
