use agency_core::effects::EntityKind;
use agency_core::policy::PermissionHint;
use agency_core::types::DbId;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/permissions/{entity}/{id}
///
/// Dry-runs the policy for every action on the entity. `entity` is one of
/// `project`, `task`, `design_asset`, `revision`, `requirement`,
/// `project_review`.
pub async fn permission_hints(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, DbId)>,
) -> AppResult<Json<DataResponse<Vec<PermissionHint>>>> {
    let hints = state
        .workflow
        .permission_hints(&auth.actor(), kind, id)
        .await?;
    Ok(Json(DataResponse { data: hints }))
}
