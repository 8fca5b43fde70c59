//! Shared multipart parsing for upload-bearing endpoints.
//!
//! Collects text fields and file parts into a [`ParsedMultipart`], enforcing
//! the configured per-file size cap before anything reaches the blob store.

use std::collections::HashMap;

use axum::extract::Multipart;
use muralis_core::error::CoreError;

use crate::error::AppError;

/// One file part from a multipart request, fully buffered.
#[derive(Debug)]
pub struct UploadedFile {
    /// The multipart field name this file arrived under.
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Text fields and files extracted from a multipart body.
#[derive(Debug, Default)]
pub struct ParsedMultipart {
    pub text: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl ParsedMultipart {
    /// A text field's value, if present and non-empty.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str).filter(|s| !s.is_empty())
    }

    /// The first file uploaded under the given field name.
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    /// All files uploaded under the given field name.
    pub fn files_for(&self, field: &str) -> Vec<&UploadedFile> {
        self.files.iter().filter(|f| f.field == field).collect()
    }
}

/// Drain a multipart body into a [`ParsedMultipart`].
///
/// Parts with a filename are treated as files, everything else as text.
/// A file larger than `max_file_bytes` fails validation before any upload.
pub async fn read_multipart(
    mut multipart: Multipart,
    max_file_bytes: usize,
) -> Result<ParsedMultipart, AppError> {
    let mut parsed = ParsedMultipart::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file part: {e}")))?;
            if bytes.len() > max_file_bytes {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "File '{filename}' exceeds the {max_file_bytes} byte upload limit"
                ))));
            }
            parsed.files.push(UploadedFile {
                field: name,
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read text part: {e}")))?;
            parsed.text.insert(name, value);
        }
    }

    Ok(parsed)
}
