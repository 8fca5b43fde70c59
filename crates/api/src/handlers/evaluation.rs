//! Handlers for the `/evaluations` resource.
//!
//! Evaluations are scoped to finished workflows, one per (workflow,
//! evaluator). An evaluator may delete their own evaluation within
//! 24 hours of creation; admins at any time.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use muralis_core::authz::{list_scope, Action, ListScope, Resource};
use muralis_core::error::CoreError;
use muralis_core::evaluation::{personnel_confirmation, validate_score, within_delete_window};
use muralis_core::lifecycle::WorkflowStatus;
use muralis_core::roles::ROLE_ADMIN;
use muralis_core::types::DbId;
use muralis_db::models::evaluation::{CreateEvaluation, Evaluation, EvaluationDetail};
use muralis_db::repositories::{EvaluationRepo, UserRepo, WorkflowRepo};
use uuid::Uuid;

use super::{authorize, ownership};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEvaluator;
use crate::multipart::read_multipart;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/evaluations
///
/// Score a finished workflow. Multipart body:
///
/// - `workflow_id` (required text)
/// - `score` (required text, integer 0..=100)
/// - `comment` (text)
/// - `evaluation_file` (optional file)
pub async fn create(
    State(state): State<AppState>,
    RequireEvaluator(user): RequireEvaluator,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Evaluation>>)> {
    let parsed = read_multipart(multipart, state.config.max_upload_bytes).await?;

    let workflow_id: Uuid = parsed
        .text_field("workflow_id")
        .ok_or_else(|| AppError::Core(CoreError::Validation("workflow_id is required".into())))?
        .parse()
        .map_err(|_| AppError::Core(CoreError::Validation("workflow_id must be a UUID".into())))?;
    let score: i16 = parsed
        .text_field("score")
        .ok_or_else(|| AppError::Core(CoreError::Validation("score is required".into())))?
        .parse()
        .map_err(|_| AppError::Core(CoreError::Validation("score must be an integer".into())))?;
    validate_score(score).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, workflow_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", workflow_id))?;
    // Only finished workflows are open for review; anything else reads as
    // absent from the evaluator's queue.
    if WorkflowStatus::parse(&workflow.status) != Some(WorkflowStatus::Finished) {
        return Err(AppError::Core(CoreError::not_found("Workflow", workflow_id)));
    }

    if EvaluationRepo::exists_for(&state.pool, workflow_id, user.user_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "You have already evaluated this workflow".into(),
        )));
    }

    let evaluation_file = match parsed.file("evaluation_file") {
        Some(file) => Some(
            state
                .store
                .upload(file.bytes.clone(), &file.filename, &file.content_type)
                .await?,
        ),
        None => None,
    };

    let evaluator = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user.user_id))?;
    let confirmation = personnel_confirmation(&evaluator.full_name, evaluator.unit.as_deref());

    // The unique constraint backstops the pre-check under concurrency.
    let evaluation = EvaluationRepo::create(
        &state.pool,
        &CreateEvaluation {
            workflow_id,
            evaluator_id: user.user_id,
            score,
            comment: parsed.text_field("comment").map(str::to_string),
            evaluation_file,
            personnel_confirmation: Some(confirmation),
        },
    )
    .await?;

    tracing::info!(
        workflow_id = %workflow_id,
        evaluation_id = evaluation.id,
        score,
        "Evaluation created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: evaluation })))
}

/// GET /api/v1/evaluations
///
/// List evaluations in the caller's scope: admins see all, evaluators their
/// own, restorers those of workflows they initiated.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<EvaluationDetail>>>> {
    let evaluations = match list_scope(&user.role, Resource::Evaluations) {
        ListScope::All => EvaluationRepo::list_all(&state.pool).await?,
        ListScope::Own => EvaluationRepo::list_by_evaluator(&state.pool, user.user_id).await?,
        ListScope::OwnWorkflows => {
            EvaluationRepo::list_for_initiator(&state.pool, user.user_id).await?
        }
    };
    Ok(Json(DataResponse { data: evaluations }))
}

/// GET /api/v1/evaluations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EvaluationDetail>>> {
    let evaluation = EvaluationRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Evaluation", id))?;

    // "Own" covers both the authoring evaluator and the initiator of the
    // evaluated workflow.
    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, evaluation.workflow_id).await?;
    let owner = if user.user_id == evaluation.evaluator_id {
        user.user_id
    } else {
        workflow
            .map(|w| w.initiator_id)
            .unwrap_or(evaluation.evaluator_id)
    };
    authorize(&user, Action::ViewEvaluation, ownership(&user, owner))?;

    Ok(Json(DataResponse { data: evaluation }))
}

/// DELETE /api/v1/evaluations/{id}
///
/// Hard delete. Owning evaluator within the 24-hour window, admin any time.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let evaluation = EvaluationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Evaluation", id))?;

    authorize(
        &user,
        Action::DeleteEvaluation,
        ownership(&user, evaluation.evaluator_id),
    )?;
    if user.role != ROLE_ADMIN && !within_delete_window(evaluation.created_at, Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Evaluations can only be deleted within 24 hours of creation".into(),
        )));
    }

    EvaluationRepo::delete(&state.pool, id).await?;
    tracing::info!(evaluation_id = id, actor = user.user_id, "Evaluation deleted");
    Ok(StatusCode::NO_CONTENT)
}
