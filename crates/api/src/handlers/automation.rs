//! Handlers for the API-key authenticated automation surface.
//!
//! Every handler runs as the configured admin actor, so the same policy
//! checks apply as for an admin calling the regular routes.

use agency_core::effects::{EntityKind, Recipients, Reference};
use agency_core::project::ProjectStatus;
use agency_core::roles::Role;
use agency_core::types::DbId;
use agency_db::models::project::Project;
use agency_db::models::task::Task;
use agency_events::DispatchReport;
use agency_workflow::automation::{PendingReview, Reminder, WeeklySummary};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AutomationKey;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub project_id: DbId,
    pub status: ProjectStatus,
}

/// Body for `POST /automation/send-reminder`. Exactly one of `user_ids`
/// and `role` selects the recipients.
#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub user_ids: Option<Vec<DbId>>,
    pub role: Option<Role>,
    pub title: String,
    pub message: String,
    pub reference_type: Option<EntityKind>,
    pub reference_id: Option<DbId>,
}

impl TryFrom<ReminderRequest> for Reminder {
    type Error = AppError;

    fn try_from(req: ReminderRequest) -> Result<Self, Self::Error> {
        let recipients = match (req.user_ids, req.role) {
            (Some(ids), None) => Recipients::Users(ids),
            (None, Some(role)) => Recipients::Role(role),
            _ => {
                return Err(AppError::BadRequest(
                    "Provide exactly one of user_ids or role".into(),
                ))
            }
        };
        let reference = match (req.reference_type, req.reference_id) {
            (Some(entity), Some(id)) => Some(Reference::new(entity, id)),
            (None, None) => None,
            _ => {
                return Err(AppError::BadRequest(
                    "reference_type and reference_id go together".into(),
                ))
            }
        };
        Ok(Reminder {
            recipients,
            title: req.title,
            message: req.message,
            reference,
        })
    }
}

// ---------------------------------------------------------------------------
// Read-only aggregates
// ---------------------------------------------------------------------------

/// GET /api/v1/automation/idle-projects
pub async fn idle_projects(
    key: AutomationKey,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.workflow.idle_projects(&key.actor).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/automation/overdue-tasks
pub async fn overdue_tasks(
    key: AutomationKey,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = state.workflow.overdue_tasks(&key.actor).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/automation/pending-reviews
pub async fn pending_reviews(
    key: AutomationKey,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PendingReview>>>> {
    let pending = state.workflow.pending_reviews(&key.actor).await?;
    Ok(Json(DataResponse { data: pending }))
}

/// GET /api/v1/automation/weekly-summary
pub async fn weekly_summary(
    key: AutomationKey,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<WeeklySummary>>> {
    let summary = state.workflow.weekly_summary(&key.actor).await?;
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/automation/project-status-update
pub async fn project_status_update(
    key: AutomationKey,
    State(state): State<AppState>,
    Json(body): Json<StatusUpdateRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .workflow
        .project_status_update(&key.actor, body.project_id, body.status)
        .await?;
    tracing::info!(
        project_id = project.id,
        status = %project.status,
        "Project status updated through automation"
    );
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/automation/send-reminder
///
/// Best-effort: the report says how many notifications landed.
pub async fn send_reminder(
    key: AutomationKey,
    State(state): State<AppState>,
    Json(body): Json<ReminderRequest>,
) -> AppResult<Json<DataResponse<DispatchReport>>> {
    let reminder = Reminder::try_from(body)?;
    let report = state.workflow.send_reminder(&key.actor, reminder).await?;
    Ok(Json(DataResponse { data: report }))
}
