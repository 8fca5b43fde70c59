//! Step log entity model: the append-only audit trail.

use muralis_core::types::{DbId, EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A step log row. Append-only: never updated or deleted, and form soft
/// deletion leaves the trail intact.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StepLog {
    pub id: DbId,
    pub form_id: EntityId,
    pub action: String,
    pub operator_id: DbId,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

/// Step log with operator and workflow context joined in, for the dashboard
/// activity feed and the per-workflow log view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StepLogDetail {
    pub id: DbId,
    pub form_id: EntityId,
    pub action: String,
    pub operator_id: DbId,
    pub operator_name: String,
    pub workflow_id: EntityId,
    pub workflow_title: String,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}
