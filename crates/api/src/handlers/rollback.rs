//! Handlers for the `/rollback-requests` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use muralis_core::authz::{list_scope, Action, ListScope, Resource};
use muralis_core::error::CoreError;
use muralis_core::lifecycle::RollbackStatus;
use muralis_core::types::DbId;
use muralis_db::models::rollback::{
    CreateRollbackRequest, RollbackRequest, RollbackRequestDetail,
};
use muralis_db::repositories::{FormRepo, ResolveOutcome, RollbackRepo, WorkflowRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{authorize, ownership};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::multipart::read_multipart;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string for `GET /rollback-requests`.
#[derive(Debug, Deserialize)]
pub struct RollbackListQuery {
    pub status: Option<String>,
}

/// Request body for `POST /rollback-requests/{id}/approve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub approve: bool,
}

/// Response for a resolution: the terminal request plus, on approval, the
/// cloned form's id.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub request: RollbackRequestDetail,
    pub cloned_form_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/rollback-requests
///
/// File a rollback petition against a finished (or running) workflow.
/// Multipart body:
///
/// - `workflow_id`, `target_form_id`, `reason` (required text)
/// - `support_file` (optional file)
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<RollbackRequest>>)> {
    let parsed = read_multipart(multipart, state.config.max_upload_bytes).await?;

    let workflow_id: Uuid = parsed
        .text_field("workflow_id")
        .ok_or_else(|| AppError::Core(CoreError::Validation("workflow_id is required".into())))?
        .parse()
        .map_err(|_| AppError::Core(CoreError::Validation("workflow_id must be a UUID".into())))?;
    let target_form_id: Uuid = parsed
        .text_field("target_form_id")
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation("target_form_id is required".into()))
        })?
        .parse()
        .map_err(|_| {
            AppError::Core(CoreError::Validation("target_form_id must be a UUID".into()))
        })?;
    let reason = parsed
        .text_field("reason")
        .ok_or_else(|| AppError::Core(CoreError::Validation("reason is required".into())))?
        .to_string();

    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, workflow_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", workflow_id))?;
    authorize(
        &user,
        Action::RequestRollback,
        ownership(&user, workflow.initiator_id),
    )?;

    let target = FormRepo::find_visible_by_id(&state.pool, target_form_id)
        .await?
        .filter(|form| form.workflow_id == workflow_id)
        .ok_or_else(|| CoreError::not_found("Form", target_form_id))?;

    let support_file_url = match parsed.file("support_file") {
        Some(file) => Some(
            state
                .store
                .upload(file.bytes.clone(), &file.filename, &file.content_type)
                .await?,
        ),
        None => None,
    };

    let request = RollbackRepo::create(
        &state.pool,
        &CreateRollbackRequest {
            workflow_id,
            requester_id: user.user_id,
            target_form_id: target.id,
            reason,
            support_file_url,
        },
    )
    .await?;

    tracing::info!(
        request_id = request.id,
        workflow_id = %workflow_id,
        target_form_id = %target_form_id,
        "Rollback request filed"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/rollback-requests?status=
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RollbackListQuery>,
) -> AppResult<Json<DataResponse<Vec<RollbackRequestDetail>>>> {
    if let Some(status) = query.status.as_deref() {
        if RollbackStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown rollback status '{status}'"
            ))));
        }
    }

    let requester_filter = match list_scope(&user.role, Resource::RollbackRequests) {
        ListScope::All => None,
        _ => Some(user.user_id),
    };
    let requests =
        RollbackRepo::list(&state.pool, requester_filter, query.status.as_deref()).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/rollback-requests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RollbackRequestDetail>>> {
    let request = RollbackRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Rollback request", id))?;
    authorize(
        &user,
        Action::ViewRollback,
        ownership(&user, request.requester_id),
    )?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/rollback-requests/{id}/approve
///
/// Resolve a pending request. Admin only. Approval clones the target form
/// into a new highest step and reopens the workflow; rejection only marks
/// the request. Either way the request becomes terminal.
pub async fn resolve(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResolveRequest>,
) -> AppResult<Json<DataResponse<ResolveResponse>>> {
    let outcome = RollbackRepo::resolve(&state.pool, id, input.approve, user.user_id).await?;

    let cloned_form_id = match outcome {
        ResolveOutcome::Approved(clone) => {
            tracing::info!(request_id = id, clone_id = %clone.id, "Rollback approved");
            Some(clone.id)
        }
        ResolveOutcome::Rejected => {
            tracing::info!(request_id = id, "Rollback rejected");
            None
        }
        // A resolved, deleted, or unknown request reads as absent.
        ResolveOutcome::NotPending => {
            return Err(AppError::Core(CoreError::not_found("Rollback request", id)));
        }
        ResolveOutcome::WorkflowGone => {
            return Err(AppError::Core(CoreError::not_found("Rollback request", id)));
        }
        ResolveOutcome::TargetFormMissing(form_id) => {
            return Err(AppError::Core(CoreError::not_found("Form", form_id)));
        }
    };

    let request = RollbackRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Rollback request", id))?;
    Ok(Json(DataResponse {
        data: ResolveResponse {
            request,
            cloned_form_id,
        },
    }))
}

/// DELETE /api/v1/rollback-requests/{id}
///
/// Soft delete. The requester may withdraw a pending request; admins may
/// delete any request.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let request = RollbackRepo::find_visible_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Rollback request", id))?;

    authorize(
        &user,
        Action::DeleteRollback,
        ownership(&user, request.requester_id),
    )?;
    let is_admin = user.role == muralis_core::roles::ROLE_ADMIN;
    if !is_admin && RollbackStatus::parse(&request.status) != Some(RollbackStatus::Pending) {
        return Err(AppError::Core(CoreError::Conflict(
            "Only pending requests can be withdrawn".into(),
        )));
    }

    RollbackRepo::soft_delete(&state.pool, id).await?;
    tracing::info!(request_id = id, actor = user.user_id, "Rollback request deleted");
    Ok(StatusCode::NO_CONTENT)
}
