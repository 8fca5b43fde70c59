//! Repository for the `forms` table and the step-submission transaction.

use muralis_core::lifecycle::{step_actions, WorkflowStatus};
use muralis_core::types::{DbId, EntityId};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::form::{CreateForm, Form, FormDetail, UpdateForm};

const COLUMNS: &str = "id, workflow_id, step_no, submitter_id, image_url, image_meta, \
    image_desc, restoration_opinion, opinion_tags, remark, attachments, \
    is_rollback_from, created_at, updated_at, deleted_at";

/// Column list for the forms-with-submitter projection.
const DETAIL_COLUMNS: &str = "f.id, f.workflow_id, f.step_no, f.submitter_id, \
    u.full_name AS submitter_name, f.image_url, f.image_meta, f.image_desc, \
    f.restoration_opinion, f.opinion_tags, f.remark, f.attachments, \
    f.is_rollback_from, f.created_at";

/// Result of the submit transaction.
#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted(Form),
    WorkflowNotFound,
    /// The workflow status refuses new submissions; carries the status value.
    NotAccepting(String),
}

/// Result of the admin soft-delete transaction.
#[derive(Debug)]
pub enum DeleteFormOutcome {
    Deleted,
    NotFound,
    /// The form is the workflow's only visible step.
    OnlyForm,
}

/// CRUD and lifecycle operations for forms.
pub struct FormRepo;

impl FormRepo {
    /// Submit the next step of a workflow.
    ///
    /// One transaction: the workflow row is locked `FOR UPDATE` so the next
    /// step number is allocated serially per workflow, then the form insert,
    /// the workflow's `current_step`/status update, and the `submit` step log
    /// commit together. The `(workflow_id, step_no)` unique constraint is the
    /// backstop should the lock ever be bypassed.
    pub async fn submit(
        pool: &PgPool,
        input: &CreateForm,
    ) -> Result<SubmitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(String,)> = sqlx::query_as(
            "SELECT status FROM workflows
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE",
        )
        .bind(input.workflow_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((status_str,)) = locked else {
            return Ok(SubmitOutcome::WorkflowNotFound);
        };

        let status = WorkflowStatus::parse(&status_str).unwrap_or(WorkflowStatus::Revoked);
        if !status.accepts_submission() {
            return Ok(SubmitOutcome::NotAccepting(status_str));
        }

        let next_step = Self::next_step_no(&mut tx, input.workflow_id).await?;

        let insert_query = format!(
            "INSERT INTO forms
                (workflow_id, step_no, submitter_id, image_url, image_meta, image_desc,
                 restoration_opinion, opinion_tags, remark, attachments)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let form = sqlx::query_as::<_, Form>(&insert_query)
            .bind(input.workflow_id)
            .bind(next_step)
            .bind(input.submitter_id)
            .bind(&input.image_url)
            .bind(&input.image_meta)
            .bind(&input.image_desc)
            .bind(&input.restoration_opinion)
            .bind(&input.opinion_tags)
            .bind(&input.remark)
            .bind(&input.attachments)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE workflows
             SET current_step = $2, status = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(input.workflow_id)
        .bind(next_step)
        .bind(status.after_submit().as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO step_logs (form_id, action, operator_id) VALUES ($1, $2, $3)",
        )
        .bind(form.id)
        .bind(step_actions::SUBMIT)
        .bind(input.submitter_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SubmitOutcome::Submitted(form))
    }

    /// Next step number over non-deleted forms, inside the caller's
    /// transaction. Must run after the workflow row is locked.
    pub(crate) async fn next_step_no(
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: EntityId,
    ) -> Result<i32, sqlx::Error> {
        let max_step: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(step_no) FROM forms WHERE workflow_id = $1 AND deleted_at IS NULL",
        )
        .bind(workflow_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(max_step.unwrap_or(0) + 1)
    }

    /// Find a non-deleted form by id.
    pub async fn find_visible_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-deleted form with the submitter's name joined in.
    pub async fn find_detail(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<FormDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM forms f
             JOIN users u ON u.id = f.submitter_id
             WHERE f.id = $1 AND f.deleted_at IS NULL"
        );
        sqlx::query_as::<_, FormDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a workflow's non-deleted forms in step order.
    pub async fn list_for_workflow(
        pool: &PgPool,
        workflow_id: EntityId,
    ) -> Result<Vec<FormDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM forms f
             JOIN users u ON u.id = f.submitter_id
             WHERE f.workflow_id = $1 AND f.deleted_at IS NULL
             ORDER BY f.step_no ASC"
        );
        sqlx::query_as::<_, FormDetail>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// Admin correction of a form's text fields, logged as `admin_update`.
    pub async fn admin_update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateForm,
        operator_id: DbId,
    ) -> Result<Option<Form>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update_query = format!(
            "UPDATE forms SET
                image_desc = COALESCE($2, image_desc),
                restoration_opinion = COALESCE($3, restoration_opinion),
                opinion_tags = COALESCE($4, opinion_tags),
                remark = COALESCE($5, remark),
                updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let Some(form) = sqlx::query_as::<_, Form>(&update_query)
            .bind(id)
            .bind(&input.image_desc)
            .bind(&input.restoration_opinion)
            .bind(&input.opinion_tags)
            .bind(&input.remark)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO step_logs (form_id, action, operator_id) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(step_actions::ADMIN_UPDATE)
        .bind(operator_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(form))
    }

    /// Admin soft delete of a form, logged as `admin_delete`.
    ///
    /// Refused for a workflow's only visible form. Recomputes the workflow's
    /// `current_step` from the remaining forms under the workflow row lock.
    pub async fn soft_delete(
        pool: &PgPool,
        id: EntityId,
        operator_id: DbId,
    ) -> Result<DeleteFormOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let workflow_id: Option<EntityId> = sqlx::query_scalar(
            "SELECT workflow_id FROM forms WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(workflow_id) = workflow_id else {
            return Ok(DeleteFormOutcome::NotFound);
        };

        sqlx::query("SELECT id FROM workflows WHERE id = $1 FOR UPDATE")
            .bind(workflow_id)
            .execute(&mut *tx)
            .await?;

        let visible_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM forms WHERE workflow_id = $1 AND deleted_at IS NULL",
        )
        .bind(workflow_id)
        .fetch_one(&mut *tx)
        .await?;
        if visible_count <= 1 {
            return Ok(DeleteFormOutcome::OnlyForm);
        }

        sqlx::query("UPDATE forms SET deleted_at = now(), updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // The deleted form may have been the highest step.
        let max_step: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(step_no) FROM forms WHERE workflow_id = $1 AND deleted_at IS NULL",
        )
        .bind(workflow_id)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query(
            "UPDATE workflows SET current_step = $2, updated_at = now() WHERE id = $1",
        )
        .bind(workflow_id)
        .bind(max_step.unwrap_or(1))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO step_logs (form_id, action, operator_id) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(step_actions::ADMIN_DELETE)
        .bind(operator_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(DeleteFormOutcome::Deleted)
    }
}
