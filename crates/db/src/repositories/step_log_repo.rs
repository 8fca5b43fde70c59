//! Repository for the `step_logs` audit trail.
//!
//! Rows are inserted by the lifecycle transactions in the workflow, form,
//! and rollback repositories; this repo is read-only.

use muralis_core::types::{DbId, EntityId};
use sqlx::PgPool;

use crate::models::step_log::{StepLog, StepLogDetail};

const COLUMNS: &str = "id, form_id, action, operator_id, comment, created_at";

/// Column list for the activity-feed projection.
const DETAIL_COLUMNS: &str = "sl.id, sl.form_id, sl.action, sl.operator_id, \
    u.full_name AS operator_name, f.workflow_id, w.title AS workflow_title, \
    sl.comment, sl.created_at";

/// Read operations over the audit trail.
pub struct StepLogRepo;

impl StepLogRepo {
    /// List a form's log entries, oldest first.
    pub async fn list_for_form(
        pool: &PgPool,
        form_id: EntityId,
    ) -> Result<Vec<StepLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM step_logs
             WHERE form_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, StepLog>(&query)
            .bind(form_id)
            .fetch_all(pool)
            .await
    }

    /// List a workflow's log entries across all of its forms, oldest first.
    pub async fn list_for_workflow(
        pool: &PgPool,
        workflow_id: EntityId,
    ) -> Result<Vec<StepLogDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM step_logs sl
             JOIN forms f ON f.id = sl.form_id
             JOIN workflows w ON w.id = f.workflow_id
             JOIN users u ON u.id = sl.operator_id
             WHERE f.workflow_id = $1
             ORDER BY sl.created_at ASC"
        );
        sqlx::query_as::<_, StepLogDetail>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// Recent activity across visible workflows, newest first, optionally
    /// limited to workflows one user initiated. Dashboard feed.
    pub async fn recent_activity(
        pool: &PgPool,
        initiator_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<StepLogDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM step_logs sl
             JOIN forms f ON f.id = sl.form_id
             JOIN workflows w ON w.id = f.workflow_id
             JOIN users u ON u.id = sl.operator_id
             WHERE w.deleted_at IS NULL
               AND ($1::BIGINT IS NULL OR w.initiator_id = $1)
             ORDER BY sl.created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, StepLogDetail>(&query)
            .bind(initiator_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
