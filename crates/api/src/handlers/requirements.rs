//! Handlers for versioned project requirements.

use agency_core::types::DbId;
use agency_db::models::requirement::Requirement;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RequirementContent {
    pub content: String,
}

/// GET /api/v1/projects/{id}/requirements
///
/// Every version, oldest first.
pub async fn list_requirements(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Requirement>>>> {
    let requirements = state
        .workflow
        .list_requirements(&auth.actor(), project_id)
        .await?;
    Ok(Json(DataResponse { data: requirements }))
}

/// POST /api/v1/projects/{id}/requirements
pub async fn create_requirement(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(body): Json<RequirementContent>,
) -> AppResult<(StatusCode, Json<DataResponse<Requirement>>)> {
    let requirement = state
        .workflow
        .create_requirement(&auth.actor(), project_id, body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: requirement })))
}

/// PUT /api/v1/requirements/{id}
pub async fn update_requirement(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<RequirementContent>,
) -> AppResult<Json<DataResponse<Requirement>>> {
    let requirement = state
        .workflow
        .update_requirement(&auth.actor(), id, body.content)
        .await?;
    Ok(Json(DataResponse { data: requirement }))
}

/// POST /api/v1/requirements/{id}/approve
pub async fn approve_requirement(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Requirement>>> {
    let requirement = state.workflow.approve_requirement(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: requirement }))
}
