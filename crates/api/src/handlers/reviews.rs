//! Handlers for developer reviews and tier recalculation.

use agency_core::types::DbId;
use agency_db::models::review::{ProjectReview, ReviewFilter, UpdateReview};
use agency_db::models::user::User;
use agency_workflow::reviews::CreateReview;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub project_id: Option<DbId>,
    pub developer_id: Option<DbId>,
}

/// GET /api/v1/reviews
///
/// Developers only ever see reviews about themselves.
pub async fn list_reviews(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReviewListQuery>,
) -> AppResult<Json<DataResponse<Vec<ProjectReview>>>> {
    let filter = ReviewFilter {
        project_id: params.project_id,
        developer_id: params.developer_id,
    };
    let reviews = state.workflow.list_reviews(&auth.actor(), &filter).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// POST /api/v1/projects/{id}/reviews
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectReview>>)> {
    let review = state
        .workflow
        .create_review(&auth.actor(), project_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// PUT /api/v1/reviews/{id}
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReview>,
) -> AppResult<Json<DataResponse<ProjectReview>>> {
    let review = state.workflow.update_review(&auth.actor(), id, input).await?;
    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.workflow.delete_review(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/developers/{id}/tier/recalculate
pub async fn recalculate_tier(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(developer_id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = state
        .workflow
        .recalculate_tier(&auth.actor(), developer_id)
        .await?;
    Ok(Json(DataResponse { data: user }))
}
