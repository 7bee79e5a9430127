//! Handlers for developer tasks.

use agency_core::task::TaskStatus;
use agency_core::types::DbId;
use agency_db::models::task::{Task, TaskFilter, UpdateTask};
use agency_workflow::tasks::{CreateTask, TaskSubmission};
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

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
}

/// Body for reject endpoints (tasks and assets).
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

type TaskResponse = AppResult<Json<DataResponse<Task>>>;

// ---------------------------------------------------------------------------
// Listing and CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks
///
/// The caller's own tasks across projects (every task for admins).
pub async fn list_my_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListQuery>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let filter = TaskFilter {
        status: params.status,
        ..TaskFilter::default()
    };
    let tasks = state.workflow.list_tasks(&auth.actor(), &filter).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/projects/{id}/tasks
pub async fn list_project_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<TaskListQuery>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let filter = TaskFilter {
        status: params.status,
        ..TaskFilter::for_project(project_id)
    };
    let tasks = state.workflow.list_tasks(&auth.actor(), &filter).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/projects/{id}/tasks
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    let task = state
        .workflow
        .create_task(&auth.actor(), project_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> TaskResponse {
    let task = state.workflow.get_task(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// PUT /api/v1/tasks/{id}
pub async fn update_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> TaskResponse {
    let task = state.workflow.update_task(&auth.actor(), id, input).await?;
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.workflow.delete_task(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/start
pub async fn start_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> TaskResponse {
    let task = state.workflow.start_task(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/submit
pub async fn submit_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(submission): Json<TaskSubmission>,
) -> TaskResponse {
    let task = state
        .workflow
        .submit_task(&auth.actor(), id, submission)
        .await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/approve
///
/// May promote the project to REVIEW when it was the last open task.
pub async fn approve_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> TaskResponse {
    let task = state.workflow.approve_task(&auth.actor(), id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/reject
pub async fn reject_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<RejectRequest>,
) -> TaskResponse {
    let task = state
        .workflow
        .reject_task(&auth.actor(), id, body.reason)
        .await?;
    Ok(Json(DataResponse { data: task }))
}
