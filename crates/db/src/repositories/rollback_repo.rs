//! Repository for the `rollback_requests` table and the resolution
//! transaction that clones the target form.

use muralis_core::lifecycle::{step_actions, RollbackStatus, WorkflowStatus};
use muralis_core::types::{DbId, EntityId};
use sqlx::PgPool;

use crate::models::form::Form;
use crate::models::rollback::{CreateRollbackRequest, RollbackRequest, RollbackRequestDetail};
use crate::repositories::form_repo::FormRepo;

const COLUMNS: &str = "id, workflow_id, requester_id, target_form_id, reason, \
    support_file_url, status, approver_id, approved_at, created_at, deleted_at";

/// Column list for the requests-with-names projection.
const DETAIL_COLUMNS: &str = "rr.id, rr.workflow_id, w.title AS workflow_title, \
    rr.requester_id, ru.full_name AS requester_name, rr.target_form_id, rr.reason, \
    rr.support_file_url, rr.status, rr.approver_id, au.full_name AS approver_name, \
    rr.approved_at, rr.created_at";

const FORM_COLUMNS: &str = "id, workflow_id, step_no, submitter_id, image_url, \
    image_meta, image_desc, restoration_opinion, opinion_tags, remark, attachments, \
    is_rollback_from, created_at, updated_at, deleted_at";

/// Result of the resolve transaction.
#[derive(Debug)]
pub enum ResolveOutcome {
    /// Approved; carries the cloned form that became the new highest step.
    Approved(Form),
    Rejected,
    /// Request missing, soft-deleted, or no longer pending. Resolution is
    /// single-shot, so a second call on the same id lands here.
    NotPending,
    /// The request's workflow has been soft-deleted since filing.
    WorkflowGone,
    /// Approval only: the target form is no longer visible. Nothing was
    /// mutated, the request stays pending. Carries the missing form's id.
    TargetFormMissing(EntityId),
}

/// CRUD and lifecycle operations for rollback requests.
pub struct RollbackRepo;

impl RollbackRepo {
    /// Insert a new pending request, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRollbackRequest,
    ) -> Result<RollbackRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO rollback_requests
                (workflow_id, requester_id, target_form_id, reason, support_file_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RollbackRequest>(&query)
            .bind(input.workflow_id)
            .bind(input.requester_id)
            .bind(input.target_form_id)
            .bind(&input.reason)
            .bind(&input.support_file_url)
            .fetch_one(pool)
            .await
    }

    /// Find a non-deleted request by id.
    pub async fn find_visible_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RollbackRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rollback_requests WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, RollbackRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-deleted request with names joined in.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RollbackRequestDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM rollback_requests rr
             JOIN workflows w ON w.id = rr.workflow_id
             JOIN users ru ON ru.id = rr.requester_id
             LEFT JOIN users au ON au.id = rr.approver_id
             WHERE rr.id = $1 AND rr.deleted_at IS NULL"
        );
        sqlx::query_as::<_, RollbackRequestDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List non-deleted requests, newest first, with optional filters.
    ///
    /// `requester_id` is the list-scope filter for non-admin roles.
    pub async fn list(
        pool: &PgPool,
        requester_id: Option<DbId>,
        status: Option<&str>,
    ) -> Result<Vec<RollbackRequestDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM rollback_requests rr
             JOIN workflows w ON w.id = rr.workflow_id
             JOIN users ru ON ru.id = rr.requester_id
             LEFT JOIN users au ON au.id = rr.approver_id
             WHERE rr.deleted_at IS NULL
               AND ($1::BIGINT IS NULL OR rr.requester_id = $1)
               AND ($2::TEXT IS NULL OR rr.status = $2)
             ORDER BY rr.created_at DESC"
        );
        sqlx::query_as::<_, RollbackRequestDetail>(&query)
            .bind(requester_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Resolve a pending request.
    ///
    /// One transaction: the request row is locked `FOR UPDATE` and its
    /// pending status checked under the lock, so resolution is single-shot.
    /// Approval additionally locks the workflow row, clones the target
    /// form's content into a new highest step with `is_rollback_from` set,
    /// reopens the workflow (`running`, `is_finalized = false`), and logs a
    /// `rollback` step on the clone. Rejection touches only the request.
    /// Both paths set `approver_id`/`approved_at` with the terminal status.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        approve: bool,
        approver_id: DbId,
    ) -> Result<ResolveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_query = format!(
            "SELECT {COLUMNS} FROM rollback_requests
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE"
        );
        let Some(request) = sqlx::query_as::<_, RollbackRequest>(&lock_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(ResolveOutcome::NotPending);
        };
        if RollbackStatus::parse(&request.status) != Some(RollbackStatus::Pending) {
            return Ok(ResolveOutcome::NotPending);
        }

        if !approve {
            sqlx::query(
                "UPDATE rollback_requests
                 SET status = $2, approver_id = $3, approved_at = now()
                 WHERE id = $1",
            )
            .bind(id)
            .bind(RollbackStatus::Rejected.as_str())
            .bind(approver_id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            return Ok(ResolveOutcome::Rejected);
        }

        let workflow_locked: Option<EntityId> = sqlx::query_scalar(
            "SELECT id FROM workflows
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE",
        )
        .bind(request.workflow_id)
        .fetch_optional(&mut *tx)
        .await?;
        if workflow_locked.is_none() {
            return Ok(ResolveOutcome::WorkflowGone);
        }

        let target_query = format!(
            "SELECT {FORM_COLUMNS} FROM forms
             WHERE id = $1 AND workflow_id = $2 AND deleted_at IS NULL"
        );
        let Some(target) = sqlx::query_as::<_, Form>(&target_query)
            .bind(request.target_form_id)
            .bind(request.workflow_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(ResolveOutcome::TargetFormMissing(request.target_form_id));
        };

        let next_step = FormRepo::next_step_no(&mut tx, request.workflow_id).await?;

        let clone_query = format!(
            "INSERT INTO forms
                (workflow_id, step_no, submitter_id, image_url, image_meta, image_desc,
                 restoration_opinion, opinion_tags, remark, attachments, is_rollback_from)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {FORM_COLUMNS}"
        );
        let clone = sqlx::query_as::<_, Form>(&clone_query)
            .bind(request.workflow_id)
            .bind(next_step)
            .bind(request.requester_id)
            .bind(&target.image_url)
            .bind(&target.image_meta)
            .bind(&target.image_desc)
            .bind(&target.restoration_opinion)
            .bind(&target.opinion_tags)
            .bind(&target.remark)
            .bind(&target.attachments)
            .bind(target.id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE workflows
             SET current_step = $2, status = $3, is_finalized = FALSE, updated_at = now()
             WHERE id = $1",
        )
        .bind(request.workflow_id)
        .bind(next_step)
        .bind(WorkflowStatus::Running.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE rollback_requests
             SET status = $2, approver_id = $3, approved_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(RollbackStatus::Approved.as_str())
        .bind(approver_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO step_logs (form_id, action, operator_id, comment)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(clone.id)
        .bind(step_actions::ROLLBACK)
        .bind(approver_id)
        .bind(&request.reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ResolveOutcome::Approved(clone))
    }

    /// Soft delete a request. Authorization (requester-while-pending vs
    /// admin) is decided by the caller against the fetched row.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rollback_requests SET deleted_at = now()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
