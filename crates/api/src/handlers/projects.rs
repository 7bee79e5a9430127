//! Handlers for `/projects` and `/fiverr-accounts`.

use agency_core::project::ProjectStatus;
use agency_core::types::DbId;
use agency_db::models::fiverr_account::{FiverrAccount, NewFiverrAccount};
use agency_db::models::project::{NewProject, Project, ProjectFilter, UpdateProject};
use axum::extract::{Path, Query, State};
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

/// Query parameters for `GET /projects`. Results are further narrowed to
/// what the caller may see.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
    pub manager_id: Option<DbId>,
    pub team_lead_id: Option<DbId>,
    pub designer_id: Option<DbId>,
}

impl ProjectListQuery {
    fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            status: self.status,
            manager_id: self.manager_id,
            team_lead_id: self.team_lead_id,
            designer_id: self.designer_id,
            updated_before: None,
        }
    }
}

/// Body for the team-lead and designer assignment endpoints.
#[derive(Debug, Deserialize)]
pub struct AssignUserRequest {
    pub user_id: DbId,
}

type ProjectResponse = AppResult<Json<DataResponse<Project>>>;

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
pub async fn list_projects(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProjectListQuery>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state
        .workflow
        .list_projects(&auth.actor(), &params.filter())
        .await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn create_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project = state.workflow.create_project(&auth.actor(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state.workflow.get_project(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> ProjectResponse {
    let project = state.workflow.update_project(&auth.actor(), id, input).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
///
/// Cascades to every child entity in one transaction.
pub async fn delete_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.workflow.delete_project(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Staffing
// ---------------------------------------------------------------------------

/// PUT /api/v1/projects/{id}/team-lead
pub async fn assign_team_lead(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<AssignUserRequest>,
) -> ProjectResponse {
    let project = state
        .workflow
        .assign_team_lead(&auth.actor(), id, body.user_id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}/designer
pub async fn assign_designer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<AssignUserRequest>,
) -> ProjectResponse {
    let project = state
        .workflow
        .assign_designer(&auth.actor(), id, body.user_id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Lifecycle transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/deliver
pub async fn mark_delivered(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state.workflow.mark_delivered(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/send-to-client
pub async fn send_to_client(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state.workflow.send_to_client(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/request-changes
pub async fn client_requests_changes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state
        .workflow
        .client_requests_changes(&auth.actor(), id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/complete
pub async fn mark_completed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state.workflow.mark_completed(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/hold
pub async fn hold_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state.workflow.hold_project(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/resume
pub async fn resume_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state.workflow.resume_project(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/cancel
pub async fn cancel_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = state.workflow.cancel_project(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Fiverr accounts
// ---------------------------------------------------------------------------

/// GET /api/v1/fiverr-accounts
pub async fn list_fiverr_accounts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<FiverrAccount>>>> {
    let accounts = state.workflow.list_fiverr_accounts(&auth.actor()).await?;
    Ok(Json(DataResponse { data: accounts }))
}

/// POST /api/v1/fiverr-accounts
///
/// Duplicate names answer 409 CONFLICT.
pub async fn create_fiverr_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewFiverrAccount>,
) -> AppResult<(StatusCode, Json<DataResponse<FiverrAccount>>)> {
    let account = state
        .workflow
        .create_fiverr_account(&auth.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: account })))
}
