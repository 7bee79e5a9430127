//! Handlers for design asset requests.

use agency_core::types::DbId;
use agency_db::models::asset::{DesignAsset, UpdateAsset};
use agency_workflow::assets::RequestAsset;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::tasks::RejectRequest;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitAssetRequest {
    pub file_url: String,
}

type AssetResponse = AppResult<Json<DataResponse<DesignAsset>>>;

/// GET /api/v1/projects/{id}/assets
pub async fn list_assets(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DesignAsset>>>> {
    let assets = state.workflow.list_assets(&auth.actor(), project_id).await?;
    Ok(Json(DataResponse { data: assets }))
}

/// POST /api/v1/projects/{id}/assets
///
/// Requires a designer on the project.
pub async fn request_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<RequestAsset>,
) -> AppResult<(StatusCode, Json<DataResponse<DesignAsset>>)> {
    let asset = state
        .workflow
        .request_asset(&auth.actor(), project_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

/// PUT /api/v1/assets/{id}
pub async fn update_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAsset>,
) -> AssetResponse {
    let asset = state.workflow.update_asset(&auth.actor(), id, input).await?;
    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/assets/{id}
pub async fn delete_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.workflow.delete_asset(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/assets/{id}/start
pub async fn start_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AssetResponse {
    let asset = state.workflow.start_asset(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: asset }))
}

/// POST /api/v1/assets/{id}/submit
pub async fn submit_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SubmitAssetRequest>,
) -> AssetResponse {
    let asset = state
        .workflow
        .submit_asset(&auth.actor(), id, body.file_url)
        .await?;
    Ok(Json(DataResponse { data: asset }))
}

/// POST /api/v1/assets/{id}/approve
pub async fn approve_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AssetResponse {
    let asset = state.workflow.approve_asset(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: asset }))
}

/// POST /api/v1/assets/{id}/reject
pub async fn reject_asset(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<RejectRequest>,
) -> AssetResponse {
    let asset = state
        .workflow
        .reject_asset(&auth.actor(), id, body.reason)
        .await?;
    Ok(Json(DataResponse { data: asset }))
}
