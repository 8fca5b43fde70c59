//! Workflow entity model and DTOs.

use muralis_core::types::{DbId, EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A workflow row from the `workflows` table.
///
/// Invariants maintained by the repository layer:
/// - `current_step` equals the highest `step_no` among non-deleted forms
///   (1 while a draft has none)
/// - `is_finalized` implies `status = finished`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workflow {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub initiator_id: DbId,
    pub current_step: i32,
    pub status: String,
    pub is_finalized: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Workflow row with the initiator's name joined in, for read paths.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowDetail {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub initiator_id: DbId,
    pub initiator_name: String,
    pub current_step: i32,
    pub status: String,
    pub is_finalized: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating a workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflow {
    pub title: String,
    pub description: Option<String>,
}

/// Request body for the admin workflow update endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkflow {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Admin status override; the only entry path for `paused`/`revoked`.
    pub status: Option<String>,
}
