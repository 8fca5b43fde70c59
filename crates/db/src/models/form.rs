//! Form entity model and DTOs.

use muralis_core::types::{DbId, EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A form row from the `forms` table: one step's submission in a workflow.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Form {
    pub id: EntityId,
    pub workflow_id: EntityId,
    pub step_no: i32,
    pub submitter_id: DbId,
    pub image_url: Option<String>,
    pub image_meta: Option<serde_json::Value>,
    pub image_desc: Option<String>,
    pub restoration_opinion: Option<String>,
    pub opinion_tags: Option<Vec<String>>,
    pub remark: Option<String>,
    pub attachments: Option<Vec<String>>,
    /// Id of the form this one was cloned from by an approved rollback.
    pub is_rollback_from: Option<EntityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Form row with the submitter's name joined in, for read paths.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormDetail {
    pub id: EntityId,
    pub workflow_id: EntityId,
    pub step_no: i32,
    pub submitter_id: DbId,
    pub submitter_name: String,
    pub image_url: Option<String>,
    pub image_meta: Option<serde_json::Value>,
    pub image_desc: Option<String>,
    pub restoration_opinion: Option<String>,
    pub opinion_tags: Option<Vec<String>>,
    pub remark: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub is_rollback_from: Option<EntityId>,
    pub created_at: Timestamp,
}

/// Content fields for a new form submission. File URLs are already uploaded
/// to blob storage by the time this reaches the repository.
#[derive(Debug, Clone)]
pub struct CreateForm {
    pub workflow_id: EntityId,
    pub submitter_id: DbId,
    pub image_url: Option<String>,
    pub image_meta: Option<serde_json::Value>,
    pub image_desc: Option<String>,
    pub restoration_opinion: Option<String>,
    pub opinion_tags: Option<Vec<String>>,
    pub remark: Option<String>,
    pub attachments: Option<Vec<String>>,
}

/// Text-field corrections applied by the admin form update endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateForm {
    pub image_desc: Option<String>,
    pub restoration_opinion: Option<String>,
    pub opinion_tags: Option<Vec<String>>,
    pub remark: Option<String>,
}
