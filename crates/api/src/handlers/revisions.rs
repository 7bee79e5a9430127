//! Handlers for client revisions and the actor work queues.

use agency_core::revision::RevisionQueue;
use agency_core::suggestion::Ranking;
use agency_core::types::DbId;
use agency_db::models::revision::Revision;
use agency_workflow::revisions::CreateRevision;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AssignDeveloperRequest {
    pub developer_id: DbId,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRevisionRequest {
    #[serde(default)]
    pub message: Option<String>,
}

type RevisionResponse = AppResult<Json<DataResponse<Revision>>>;

// ---------------------------------------------------------------------------
// Project-scoped
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/revisions
pub async fn list_revisions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Revision>>>> {
    let revisions = state
        .workflow
        .list_revisions(&auth.actor(), project_id)
        .await?;
    Ok(Json(DataResponse { data: revisions }))
}

/// POST /api/v1/projects/{id}/revisions
///
/// Forces the project back to CLIENT_REVIEW.
pub async fn create_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateRevision>,
) -> AppResult<(StatusCode, Json<DataResponse<Revision>>)> {
    let revision = state
        .workflow
        .create_revision(&auth.actor(), project_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: revision })))
}

/// GET /api/v1/projects/{id}/revisions/suggestions
pub async fn suggest_developers(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ranking>>> {
    let ranking = state
        .workflow
        .suggest_developers(&auth.actor(), project_id)
        .await?;
    Ok(Json(DataResponse { data: ranking }))
}

// ---------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------

/// GET /api/v1/revisions/queue/{queue}
///
/// `pending` and `submitted` for team leads, `completed` for managers,
/// `assigned` for developers. Oldest first.
pub async fn revision_queue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(queue): Path<RevisionQueue>,
) -> AppResult<Json<DataResponse<Vec<Revision>>>> {
    let revisions = state.workflow.revision_queue(&auth.actor(), queue).await?;
    Ok(Json(DataResponse { data: revisions }))
}

// ---------------------------------------------------------------------------
// Single revision
// ---------------------------------------------------------------------------

/// GET /api/v1/revisions/{id}
pub async fn get_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RevisionResponse {
    let revision = state.workflow.get_revision(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: revision }))
}

/// DELETE /api/v1/revisions/{id}
pub async fn delete_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.workflow.delete_revision(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/revisions/{id}/developer
pub async fn assign_developer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<AssignDeveloperRequest>,
) -> RevisionResponse {
    let revision = state
        .workflow
        .assign_revision_developer(&auth.actor(), id, body.developer_id)
        .await?;
    Ok(Json(DataResponse { data: revision }))
}

/// POST /api/v1/revisions/{id}/start
pub async fn start_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RevisionResponse {
    let revision = state.workflow.start_revision(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: revision }))
}

/// POST /api/v1/revisions/{id}/submit
pub async fn submit_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SubmitRevisionRequest>,
) -> RevisionResponse {
    let revision = state
        .workflow
        .submit_revision(&auth.actor(), id, body.message)
        .await?;
    Ok(Json(DataResponse { data: revision }))
}

/// POST /api/v1/revisions/{id}/complete
pub async fn complete_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RevisionResponse {
    let revision = state.workflow.complete_revision(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: revision }))
}

/// POST /api/v1/revisions/{id}/accept
pub async fn accept_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> RevisionResponse {
    let revision = state.workflow.accept_revision(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: revision }))
}
