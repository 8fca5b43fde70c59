//! Handlers for the `/workflows` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use muralis_core::authz::{list_scope, Action, ListScope, Resource};
use muralis_core::error::CoreError;
use muralis_core::lifecycle::WorkflowStatus;
use muralis_db::models::evaluation::EvaluationDetail;
use muralis_db::models::form::FormDetail;
use muralis_db::models::step_log::StepLogDetail;
use muralis_db::models::workflow::{CreateWorkflow, Workflow, WorkflowDetail};
use muralis_db::repositories::{
    EvaluationRepo, FinalizeOutcome, FormRepo, StepLogRepo, WorkflowRepo,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{authorize, ownership};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query string for `GET /workflows`.
#[derive(Debug, Deserialize)]
pub struct WorkflowListQuery {
    pub status: Option<String>,
}

/// Request body for `POST /workflows/{id}/finalize`.
#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub final_form_id: Uuid,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/workflows
///
/// Open a new draft workflow with the caller as initiator.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateWorkflow>,
) -> AppResult<(StatusCode, Json<DataResponse<Workflow>>)> {
    authorize(&user, Action::CreateWorkflow, ownership(&user, user.user_id))?;

    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title is required".into(),
        )));
    }

    let workflow = WorkflowRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(workflow_id = %workflow.id, initiator = user.user_id, "Workflow created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: workflow })))
}

/// GET /api/v1/workflows?status=
///
/// List workflows visible to the caller's role, optionally filtered by status.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WorkflowListQuery>,
) -> AppResult<Json<DataResponse<Vec<WorkflowDetail>>>> {
    if let Some(status) = query.status.as_deref() {
        if WorkflowStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown workflow status '{status}'"
            ))));
        }
    }

    let initiator_filter = match list_scope(&user.role, Resource::Workflows) {
        ListScope::All => None,
        _ => Some(user.user_id),
    };
    let workflows =
        WorkflowRepo::list(&state.pool, initiator_filter, query.status.as_deref()).await?;
    Ok(Json(DataResponse { data: workflows }))
}

/// GET /api/v1/workflows/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<WorkflowDetail>>> {
    let workflow = WorkflowRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", id))?;
    authorize(
        &user,
        Action::ViewWorkflow,
        ownership(&user, workflow.initiator_id),
    )?;
    Ok(Json(DataResponse { data: workflow }))
}

/// POST /api/v1/workflows/{id}/finalize
///
/// Mark a running workflow finished with the chosen form as its accepted
/// outcome. Initiator or admin only.
pub async fn finalize(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<FinalizeRequest>,
) -> AppResult<Json<DataResponse<Workflow>>> {
    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", id))?;
    authorize(
        &user,
        Action::FinalizeWorkflow,
        ownership(&user, workflow.initiator_id),
    )?;

    let outcome =
        WorkflowRepo::finalize(&state.pool, id, input.final_form_id, user.user_id).await?;
    match outcome {
        FinalizeOutcome::Finalized(workflow) => {
            tracing::info!(workflow_id = %id, actor = user.user_id, "Workflow finalized");
            Ok(Json(DataResponse { data: workflow }))
        }
        FinalizeOutcome::WorkflowNotFound => {
            Err(AppError::Core(CoreError::not_found("Workflow", id)))
        }
        FinalizeOutcome::FormNotFound => Err(AppError::Core(CoreError::not_found(
            "Form",
            input.final_form_id,
        ))),
        FinalizeOutcome::Refused(reason) => {
            Err(AppError::Core(CoreError::Conflict(reason.to_string())))
        }
    }
}

/// GET /api/v1/workflows/{id}/forms
///
/// A workflow's visible forms in step order.
pub async fn list_forms(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Vec<FormDetail>>>> {
    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", id))?;
    authorize(
        &user,
        Action::ViewWorkflow,
        ownership(&user, workflow.initiator_id),
    )?;

    let forms = FormRepo::list_for_workflow(&state.pool, id).await?;
    Ok(Json(DataResponse { data: forms }))
}

/// GET /api/v1/workflows/{id}/evaluations
pub async fn list_evaluations(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Vec<EvaluationDetail>>>> {
    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", id))?;
    authorize(
        &user,
        Action::ViewEvaluation,
        ownership(&user, workflow.initiator_id),
    )?;

    let evaluations = EvaluationRepo::list_for_workflow(&state.pool, id).await?;
    Ok(Json(DataResponse { data: evaluations }))
}

/// GET /api/v1/workflows/{id}/logs
///
/// The full audit trail across the workflow's forms, oldest first.
/// Soft-deleted forms keep their entries.
pub async fn list_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Vec<StepLogDetail>>>> {
    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", id))?;
    authorize(
        &user,
        Action::ViewWorkflow,
        ownership(&user, workflow.initiator_id),
    )?;

    let logs = StepLogRepo::list_for_workflow(&state.pool, id).await?;
    Ok(Json(DataResponse { data: logs }))
}
