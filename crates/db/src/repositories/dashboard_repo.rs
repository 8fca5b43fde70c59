//! Aggregate queries backing the dashboard endpoint.
//!
//! All counts run over visible rows only (`deleted_at IS NULL` on workflows
//! and forms); evaluations have no soft delete.

use muralis_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{DashboardTotals, StatusCount};

/// Read-only aggregations for the dashboard.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Headline totals, optionally scoped to one initiator's workflows.
    pub async fn totals(
        pool: &PgPool,
        initiator_id: Option<DbId>,
    ) -> Result<DashboardTotals, sqlx::Error> {
        sqlx::query_as::<_, DashboardTotals>(
            "SELECT
                (SELECT COUNT(*) FROM workflows w
                 WHERE w.deleted_at IS NULL
                   AND ($1::BIGINT IS NULL OR w.initiator_id = $1)) AS workflows,
                (SELECT COUNT(*) FROM forms f
                 JOIN workflows w ON w.id = f.workflow_id
                 WHERE f.deleted_at IS NULL AND w.deleted_at IS NULL
                   AND ($1::BIGINT IS NULL OR w.initiator_id = $1)) AS forms,
                (SELECT COUNT(*) FROM evaluations e
                 JOIN workflows w ON w.id = e.workflow_id
                 WHERE w.deleted_at IS NULL
                   AND ($1::BIGINT IS NULL OR w.initiator_id = $1)) AS evaluations,
                (SELECT COUNT(*) FROM rollback_requests rr
                 JOIN workflows w ON w.id = rr.workflow_id
                 WHERE rr.deleted_at IS NULL AND rr.status = 'pending'
                   AND w.deleted_at IS NULL
                   AND ($1::BIGINT IS NULL OR w.initiator_id = $1)) AS pending_rollbacks",
        )
        .bind(initiator_id)
        .fetch_one(pool)
        .await
    }

    /// Workflow counts grouped by status, optionally scoped to one
    /// initiator. Statuses with zero workflows are absent from the result.
    pub async fn status_counts(
        pool: &PgPool,
        initiator_id: Option<DbId>,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM workflows
             WHERE deleted_at IS NULL
               AND ($1::BIGINT IS NULL OR initiator_id = $1)
             GROUP BY status
             ORDER BY status",
        )
        .bind(initiator_id)
        .fetch_all(pool)
        .await
    }

    /// Number of evaluations authored by one evaluator.
    pub async fn evaluation_count_for(
        pool: &PgPool,
        evaluator_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM evaluations WHERE evaluator_id = $1")
            .bind(evaluator_id)
            .fetch_one(pool)
            .await
    }

    /// Finished workflows the given evaluator has not scored yet. The
    /// evaluator's work queue.
    pub async fn pending_evaluation_count_for(
        pool: &PgPool,
        evaluator_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM workflows w
             WHERE w.deleted_at IS NULL AND w.status = 'finished'
               AND NOT EXISTS (
                   SELECT 1 FROM evaluations e
                   WHERE e.workflow_id = w.id AND e.evaluator_id = $1
               )",
        )
        .bind(evaluator_id)
        .fetch_one(pool)
        .await
    }
}
