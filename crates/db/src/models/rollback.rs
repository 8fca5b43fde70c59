//! Rollback request entity model and DTOs.

use muralis_core::types::{DbId, EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A rollback request row: a restorer's petition to revert a workflow to an
/// earlier form. `approved`/`rejected` are terminal.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RollbackRequest {
    pub id: DbId,
    pub workflow_id: EntityId,
    pub requester_id: DbId,
    pub target_form_id: EntityId,
    pub reason: String,
    pub support_file_url: Option<String>,
    pub status: String,
    pub approver_id: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Rollback request with requester/approver names joined in, for read paths.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RollbackRequestDetail {
    pub id: DbId,
    pub workflow_id: EntityId,
    pub workflow_title: String,
    pub requester_id: DbId,
    pub requester_name: String,
    pub target_form_id: EntityId,
    pub reason: String,
    pub support_file_url: Option<String>,
    pub status: String,
    pub approver_id: Option<DbId>,
    pub approver_name: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new rollback request (created `pending`).
#[derive(Debug, Clone)]
pub struct CreateRollbackRequest {
    pub workflow_id: EntityId,
    pub requester_id: DbId,
    pub target_form_id: EntityId,
    pub reason: String,
    pub support_file_url: Option<String>,
}
