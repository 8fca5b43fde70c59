//! Repository for the `workflows` table and its lifecycle transitions.

use muralis_core::lifecycle::{self, step_actions, WorkflowStatus};
use muralis_core::types::{DbId, EntityId};
use sqlx::PgPool;

use crate::models::workflow::{CreateWorkflow, UpdateWorkflow, Workflow, WorkflowDetail};

const COLUMNS: &str = "id, title, description, initiator_id, current_step, status, \
    is_finalized, created_at, updated_at, deleted_at";

/// Column list for the workflows-with-initiator projection.
const DETAIL_COLUMNS: &str = "w.id, w.title, w.description, w.initiator_id, \
    u.full_name AS initiator_name, w.current_step, w.status, w.is_finalized, \
    w.created_at, w.updated_at";

/// Result of the finalize transaction.
#[derive(Debug)]
pub enum FinalizeOutcome {
    Finalized(Workflow),
    /// Workflow missing or soft-deleted.
    WorkflowNotFound,
    /// Final form missing, soft-deleted, or belonging to another workflow.
    FormNotFound,
    /// Status or finalized flag refuses the transition; carries the reason.
    Refused(&'static str),
}

/// Result of the admin soft-delete transaction.
#[derive(Debug)]
pub enum DeleteWorkflowOutcome {
    Deleted,
    NotFound,
    /// At least one non-deleted form still exists.
    HasForms,
}

/// Result of the admin update transaction.
#[derive(Debug)]
pub enum UpdateWorkflowOutcome {
    Updated(Workflow),
    NotFound,
    /// The requested status transition is not defined; carries the reason.
    Refused(&'static str),
}

/// CRUD and lifecycle operations for workflows.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Insert a new draft workflow, returning the created row.
    pub async fn create(
        pool: &PgPool,
        initiator_id: DbId,
        input: &CreateWorkflow,
    ) -> Result<Workflow, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflows (title, description, initiator_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(initiator_id)
            .fetch_one(pool)
            .await
    }

    /// Find a non-deleted workflow by id.
    pub async fn find_visible_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflows WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-deleted workflow with the initiator's name joined in.
    pub async fn find_detail(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<WorkflowDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM workflows w
             JOIN users u ON u.id = w.initiator_id
             WHERE w.id = $1 AND w.deleted_at IS NULL"
        );
        sqlx::query_as::<_, WorkflowDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List non-deleted workflows, newest first, with optional filters.
    ///
    /// `initiator_id` is the list-scope filter for restorers; `status`
    /// narrows by the exact column value.
    pub async fn list(
        pool: &PgPool,
        initiator_id: Option<DbId>,
        status: Option<&str>,
    ) -> Result<Vec<WorkflowDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM workflows w
             JOIN users u ON u.id = w.initiator_id
             WHERE w.deleted_at IS NULL
               AND ($1::BIGINT IS NULL OR w.initiator_id = $1)
               AND ($2::TEXT IS NULL OR w.status = $2)
             ORDER BY w.created_at DESC"
        );
        sqlx::query_as::<_, WorkflowDetail>(&query)
            .bind(initiator_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Finalize a workflow against a chosen final form.
    ///
    /// One transaction: the workflow row is locked `FOR UPDATE`, the status
    /// and finalized flag are checked under the lock, the form's membership
    /// is verified, and the status change plus its `finalize` step log commit
    /// together or not at all.
    pub async fn finalize(
        pool: &PgPool,
        workflow_id: EntityId,
        final_form_id: EntityId,
        actor_id: DbId,
    ) -> Result<FinalizeOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_query = format!(
            "SELECT {COLUMNS} FROM workflows
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE"
        );
        let Some(workflow) = sqlx::query_as::<_, Workflow>(&lock_query)
            .bind(workflow_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(FinalizeOutcome::WorkflowNotFound);
        };

        let status = WorkflowStatus::parse(&workflow.status)
            .unwrap_or(WorkflowStatus::Revoked);
        if let Err(reason) = lifecycle::check_finalize(status, workflow.is_finalized) {
            return Ok(FinalizeOutcome::Refused(reason));
        }

        let form_exists: Option<EntityId> = sqlx::query_scalar(
            "SELECT id FROM forms
             WHERE id = $1 AND workflow_id = $2 AND deleted_at IS NULL",
        )
        .bind(final_form_id)
        .bind(workflow_id)
        .fetch_optional(&mut *tx)
        .await?;
        if form_exists.is_none() {
            return Ok(FinalizeOutcome::FormNotFound);
        }

        let update_query = format!(
            "UPDATE workflows
             SET status = $2, is_finalized = TRUE, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Workflow>(&update_query)
            .bind(workflow_id)
            .bind(WorkflowStatus::Finished.as_str())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO step_logs (form_id, action, operator_id) VALUES ($1, $2, $3)",
        )
        .bind(final_form_id)
        .bind(step_actions::FINALIZE)
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(FinalizeOutcome::Finalized(updated))
    }

    /// Admin correction: title, description, and the status override.
    ///
    /// The status override is the only entry path for `paused` and `revoked`.
    /// Moving a workflow out of `revoked` is refused. Setting `revoked` logs
    /// a `revoke` step on the latest visible form, when one exists.
    pub async fn admin_update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateWorkflow,
        operator_id: DbId,
    ) -> Result<UpdateWorkflowOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_query = format!(
            "SELECT {COLUMNS} FROM workflows
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE"
        );
        let Some(workflow) = sqlx::query_as::<_, Workflow>(&lock_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(UpdateWorkflowOutcome::NotFound);
        };

        let mut entering_revoked = false;
        if let Some(next_str) = input.status.as_deref() {
            let Some(next) = WorkflowStatus::parse(next_str) else {
                return Ok(UpdateWorkflowOutcome::Refused("unknown workflow status"));
            };
            let current = WorkflowStatus::parse(&workflow.status)
                .unwrap_or(WorkflowStatus::Revoked);
            if let Err(reason) = lifecycle::check_admin_status_edit(current, next) {
                return Ok(UpdateWorkflowOutcome::Refused(reason));
            }
            entering_revoked =
                next == WorkflowStatus::Revoked && current != WorkflowStatus::Revoked;
        }

        let update_query = format!(
            "UPDATE workflows SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Workflow>(&update_query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .fetch_one(&mut *tx)
            .await?;

        if entering_revoked {
            let latest_form: Option<EntityId> = sqlx::query_scalar(
                "SELECT id FROM forms
                 WHERE workflow_id = $1 AND deleted_at IS NULL
                 ORDER BY step_no DESC
                 LIMIT 1",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            if let Some(form_id) = latest_form {
                sqlx::query(
                    "INSERT INTO step_logs (form_id, action, operator_id) VALUES ($1, $2, $3)",
                )
                .bind(form_id)
                .bind(step_actions::REVOKE)
                .bind(operator_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(UpdateWorkflowOutcome::Updated(updated))
    }

    /// Admin soft delete. Refused while any non-deleted form exists.
    pub async fn soft_delete(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<DeleteWorkflowOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<EntityId> = sqlx::query_scalar(
            "SELECT id FROM workflows
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(DeleteWorkflowOutcome::NotFound);
        }

        let form_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM forms WHERE workflow_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if form_count > 0 {
            return Ok(DeleteWorkflowOutcome::HasForms);
        }

        sqlx::query("UPDATE workflows SET deleted_at = now(), updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteWorkflowOutcome::Deleted)
    }
}
