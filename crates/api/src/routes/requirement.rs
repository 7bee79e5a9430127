use axum::routing::{post, put};
use axum::Router;

use crate::handlers::requirements;
use crate::state::AppState;

/// Routes mounted at `/requirements`.
///
/// ```text
/// PUT    /{id}            -> update_requirement
/// POST   /{id}/approve    -> approve_requirement
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(requirements::update_requirement))
        .route("/{id}/approve", post(requirements::approve_requirement))
}
