use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// GET    /        -> list_reviews
/// PUT    /{id}    -> update_review
/// DELETE /{id}    -> delete_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list_reviews))
        .route("/{id}", put(reviews::update_review).delete(reviews::delete_review))
}

/// Routes mounted at `/developers`.
pub fn developer_router() -> Router<AppState> {
    Router::new().route("/{id}/tier/recalculate", post(reviews::recalculate_tier))
}
