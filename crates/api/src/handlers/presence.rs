use agency_core::types::DbId;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Presence {
    pub user_id: DbId,
    pub online: bool,
}

/// GET /api/v1/users/{id}/presence
///
/// Online means at least one open realtime connection on this node.
pub async fn get_presence(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Presence>>> {
    let online = state.ws_manager.is_online(user_id).await;
    Ok(Json(DataResponse {
        data: Presence { user_id, online },
    }))
}
