//! Generic authenticated file upload.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use muralis_core::error::CoreError;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::multipart::read_multipart;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for a stored file.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: usize,
}

/// POST /api/v1/uploads
///
/// Store a single file from a multipart body (field name `file`) and return
/// its URL.
pub async fn upload(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadResponse>>)> {
    let parsed = read_multipart(multipart, state.config.max_upload_bytes).await?;
    let file = parsed
        .file("file")
        .ok_or_else(|| AppError::Core(CoreError::Validation("Missing 'file' part".into())))?;

    let size = file.bytes.len();
    let url = state
        .store
        .upload(file.bytes.clone(), &file.filename, &file.content_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse {
                url,
                filename: file.filename.clone(),
                size,
            },
        }),
    ))
}
