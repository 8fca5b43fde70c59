//! Administrative overrides: workflow/form edits outside the normal
//! lifecycle, plus user management. All routes require the admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use muralis_core::email::{is_valid_email, normalize_email};
use muralis_core::error::CoreError;
use muralis_core::lifecycle::WorkflowStatus;
use muralis_core::types::EntityId;
use muralis_db::models::form::{Form, UpdateForm};
use muralis_db::models::user::{CreateUser, UserResponse};
use muralis_db::models::workflow::{UpdateWorkflow, Workflow, WorkflowDetail};
use muralis_db::repositories::{
    DeleteFormOutcome, DeleteWorkflowOutcome, FormRepo, RoleRepo, UpdateWorkflowOutcome,
    UserRepo, WorkflowRepo,
};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::handlers::workflow::WorkflowListQuery;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/workflows?status=
///
/// Unscoped listing, soft-deleted rows excluded.
pub async fn list_workflows(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<WorkflowListQuery>,
) -> AppResult<Json<DataResponse<Vec<WorkflowDetail>>>> {
    if let Some(status) = query.status.as_deref() {
        if WorkflowStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown workflow status '{status}'"
            ))));
        }
    }
    let workflows = WorkflowRepo::list(&state.pool, None, query.status.as_deref()).await?;
    Ok(Json(DataResponse { data: workflows }))
}

/// PUT /api/v1/admin/workflows/{id}
///
/// Corrective edit of title, description, or status. Setting the status to
/// `revoked` closes the workflow permanently and leaves a `revoke` entry in
/// the audit trail.
pub async fn update_workflow(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateWorkflow>,
) -> AppResult<Json<DataResponse<Workflow>>> {
    if let Some(status) = input.status.as_deref() {
        if WorkflowStatus::parse(status).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown workflow status '{status}'"
            ))));
        }
    }

    match WorkflowRepo::admin_update(&state.pool, id, &input, user.user_id).await? {
        UpdateWorkflowOutcome::Updated(workflow) => {
            tracing::info!(workflow_id = %id, actor = user.user_id, "Workflow updated by admin");
            Ok(Json(DataResponse { data: workflow }))
        }
        UpdateWorkflowOutcome::NotFound => {
            Err(AppError::Core(CoreError::not_found("Workflow", id)))
        }
        UpdateWorkflowOutcome::Refused(reason) => {
            Err(AppError::Core(CoreError::Conflict(reason.to_string())))
        }
    }
}

/// DELETE /api/v1/admin/workflows/{id}
///
/// Soft delete, refused while the workflow still has visible forms.
pub async fn delete_workflow(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    match WorkflowRepo::soft_delete(&state.pool, id).await? {
        DeleteWorkflowOutcome::Deleted => {
            tracing::info!(workflow_id = %id, actor = user.user_id, "Workflow deleted by admin");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteWorkflowOutcome::NotFound => {
            Err(AppError::Core(CoreError::not_found("Workflow", id)))
        }
        DeleteWorkflowOutcome::HasForms => Err(AppError::Core(CoreError::Conflict(
            "Delete the workflow's forms before deleting the workflow".into(),
        ))),
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/forms/{id}
pub async fn update_form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateForm>,
) -> AppResult<Json<DataResponse<Form>>> {
    let form = FormRepo::admin_update(&state.pool, id, &input, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Form", id))?;
    tracing::info!(form_id = %id, actor = user.user_id, "Form updated by admin");
    Ok(Json(DataResponse { data: form }))
}

/// DELETE /api/v1/admin/forms/{id}
///
/// Soft delete. A workflow's only form cannot be deleted; delete the
/// workflow instead.
pub async fn delete_form(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    match FormRepo::soft_delete(&state.pool, id, user.user_id).await? {
        DeleteFormOutcome::Deleted => {
            tracing::info!(form_id = %id, actor = user.user_id, "Form deleted by admin");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteFormOutcome::NotFound => Err(AppError::Core(CoreError::not_found("Form", id))),
        DeleteFormOutcome::OnlyForm => Err(AppError::Core(CoreError::Conflict(
            "A workflow's only form cannot be deleted".into(),
        ))),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub unit: Option<String>,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/admin/users
///
/// Direct account creation, any role, no email verification.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    if input.username.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "username is required".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let email = match input.email.as_deref() {
        Some(raw) => {
            let email = normalize_email(raw);
            if !is_valid_email(&email) {
                return Err(AppError::Core(CoreError::Validation(
                    "email is not a valid address".into(),
                )));
            }
            Some(email)
        }
        None => None,
    };

    let role = RoleRepo::find_by_key(&state.pool, &input.role)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown role '{}'",
                input.role
            )))
        })?;

    let password_hash = hash_password(&input.password)
        .map_err(|err| AppError::InternalError(format!("Password hashing failed: {err}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username.trim().to_string(),
            password_hash,
            full_name: input.full_name,
            role_id: role.id,
            email,
            phone: input.phone,
            unit: input.unit,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, actor = admin.user_id, "User created by admin");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}
