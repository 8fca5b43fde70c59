//! Handlers for the `/forms` resource (step submission and reads).

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use muralis_core::authz::Action;
use muralis_core::error::CoreError;
use muralis_db::models::form::{CreateForm, Form, FormDetail};
use muralis_db::models::step_log::StepLog;
use muralis_db::repositories::{FormRepo, StepLogRepo, SubmitOutcome, WorkflowRepo};
use serde_json::json;
use uuid::Uuid;

use super::{authorize, ownership};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::multipart::{read_multipart, ParsedMultipart};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/forms
///
/// Submit the next step of a workflow. Multipart body:
///
/// - `workflow_id` (required text)
/// - `image_desc`, `restoration_opinion`, `opinion_tags`, `remark` (text)
/// - `image` (optional file)
/// - `attachments` (repeatable file field)
///
/// Files are uploaded to the blob store before any database write; an
/// upload failure aborts the submission with no database mutation.
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Form>>)> {
    let parsed = read_multipart(multipart, state.config.max_upload_bytes).await?;

    let workflow_id: Uuid = parsed
        .text_field("workflow_id")
        .ok_or_else(|| AppError::Core(CoreError::Validation("workflow_id is required".into())))?
        .parse()
        .map_err(|_| AppError::Core(CoreError::Validation("workflow_id must be a UUID".into())))?;

    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, workflow_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", workflow_id))?;
    authorize(
        &user,
        Action::SubmitForm,
        ownership(&user, workflow.initiator_id),
    )?;

    // Blob uploads happen first; a failed upload leaves the workflow
    // untouched. An orphaned blob after a later DB failure is acceptable.
    let mut image_url = None;
    let mut image_meta = None;
    if let Some(image) = parsed.file("image") {
        let url = state
            .store
            .upload(image.bytes.clone(), &image.filename, &image.content_type)
            .await?;
        image_meta = Some(json!({
            "filename": image.filename,
            "content_type": image.content_type,
            "size": image.bytes.len(),
        }));
        image_url = Some(url);
    }

    let mut attachments = Vec::new();
    for attachment in parsed.files_for("attachments") {
        let url = state
            .store
            .upload(
                attachment.bytes.clone(),
                &attachment.filename,
                &attachment.content_type,
            )
            .await?;
        attachments.push(url);
    }

    let input = CreateForm {
        workflow_id,
        submitter_id: user.user_id,
        image_url,
        image_meta,
        image_desc: parsed.text_field("image_desc").map(str::to_string),
        restoration_opinion: parsed.text_field("restoration_opinion").map(str::to_string),
        opinion_tags: parse_tags(&parsed),
        remark: parsed.text_field("remark").map(str::to_string),
        attachments: if attachments.is_empty() {
            None
        } else {
            Some(attachments)
        },
    };

    match FormRepo::submit(&state.pool, &input).await? {
        SubmitOutcome::Submitted(form) => {
            tracing::info!(
                workflow_id = %workflow_id,
                form_id = %form.id,
                step_no = form.step_no,
                "Form submitted"
            );
            Ok((StatusCode::CREATED, Json(DataResponse { data: form })))
        }
        SubmitOutcome::WorkflowNotFound => {
            Err(AppError::Core(CoreError::not_found("Workflow", workflow_id)))
        }
        SubmitOutcome::NotAccepting(status) => Err(AppError::Core(CoreError::Conflict(format!(
            "Workflow in status '{status}' does not accept submissions"
        )))),
    }
}

/// GET /api/v1/forms/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<FormDetail>>> {
    let form = FormRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Form", id))?;

    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, form.workflow_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", form.workflow_id))?;
    authorize(
        &user,
        Action::ViewWorkflow,
        ownership(&user, workflow.initiator_id),
    )?;

    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/forms/{id}/logs
///
/// The form's audit trail, oldest first.
pub async fn list_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Vec<StepLog>>>> {
    let form = FormRepo::find_visible_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Form", id))?;

    let workflow = WorkflowRepo::find_visible_by_id(&state.pool, form.workflow_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workflow", form.workflow_id))?;
    authorize(
        &user,
        Action::ViewWorkflow,
        ownership(&user, workflow.initiator_id),
    )?;

    let logs = StepLogRepo::list_for_form(&state.pool, id).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// Opinion tags arrive as a comma-separated text field.
fn parse_tags(parsed: &ParsedMultipart) -> Option<Vec<String>> {
    let raw = parsed.text_field("opinion_tags")?;
    let tags: Vec<String> = raw
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}
