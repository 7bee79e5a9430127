use axum::routing::{post, put};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// PUT    /{id}            -> update_asset
/// DELETE /{id}            -> delete_asset
/// POST   /{id}/start      -> start_asset
/// POST   /{id}/submit     -> submit_asset
/// POST   /{id}/approve    -> approve_asset
/// POST   /{id}/reject     -> reject_asset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(assets::update_asset).delete(assets::delete_asset))
        .route("/{id}/start", post(assets::start_asset))
        .route("/{id}/submit", post(assets::submit_asset))
        .route("/{id}/approve", post(assets::approve_asset))
        .route("/{id}/reject", post(assets::reject_asset))
}
