use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                -> list_my_tasks
/// GET    /{id}            -> get_task
/// PUT    /{id}            -> update_task
/// DELETE /{id}            -> delete_task
/// POST   /{id}/start      -> start_task
/// POST   /{id}/submit     -> submit_task
/// POST   /{id}/approve    -> approve_task
/// POST   /{id}/reject     -> reject_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_my_tasks))
        .route(
            "/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/{id}/start", post(tasks::start_task))
        .route("/{id}/submit", post(tasks::submit_task))
        .route("/{id}/approve", post(tasks::approve_task))
        .route("/{id}/reject", post(tasks::reject_task))
}
