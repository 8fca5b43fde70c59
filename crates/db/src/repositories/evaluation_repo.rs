//! Repository for the `evaluations` table.

use muralis_core::types::{DbId, EntityId};
use sqlx::PgPool;

use crate::models::evaluation::{CreateEvaluation, Evaluation, EvaluationDetail};

const COLUMNS: &str = "id, workflow_id, evaluator_id, score, comment, \
    evaluation_file, personnel_confirmation, created_at, updated_at";

/// Column list for the evaluations-with-evaluator projection.
const DETAIL_COLUMNS: &str = "e.id, e.workflow_id, e.evaluator_id, \
    u.full_name AS evaluator_name, e.score, e.comment, e.evaluation_file, \
    e.personnel_confirmation, e.created_at, e.updated_at";

/// CRUD operations for evaluations. Evaluations are hard-deleted; the table
/// carries no `deleted_at`.
pub struct EvaluationRepo;

impl EvaluationRepo {
    /// Insert a new evaluation, returning the created row.
    ///
    /// The `(workflow_id, evaluator_id)` unique constraint backstops the
    /// caller's duplicate pre-check.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEvaluation,
    ) -> Result<Evaluation, sqlx::Error> {
        let query = format!(
            "INSERT INTO evaluations
                (workflow_id, evaluator_id, score, comment, evaluation_file,
                 personnel_confirmation)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Evaluation>(&query)
            .bind(input.workflow_id)
            .bind(input.evaluator_id)
            .bind(input.score)
            .bind(&input.comment)
            .bind(&input.evaluation_file)
            .bind(&input.personnel_confirmation)
            .fetch_one(pool)
            .await
    }

    /// Whether this evaluator has already scored this workflow.
    pub async fn exists_for(
        pool: &PgPool,
        workflow_id: EntityId,
        evaluator_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM evaluations WHERE workflow_id = $1 AND evaluator_id = $2
             )",
        )
        .bind(workflow_id)
        .bind(evaluator_id)
        .fetch_one(pool)
        .await
    }

    /// Find an evaluation by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Evaluation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM evaluations WHERE id = $1");
        sqlx::query_as::<_, Evaluation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an evaluation with the evaluator's name joined in.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EvaluationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM evaluations e
             JOIN users u ON u.id = e.evaluator_id
             WHERE e.id = $1"
        );
        sqlx::query_as::<_, EvaluationDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all evaluations, newest first. Admin scope.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<EvaluationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM evaluations e
             JOIN users u ON u.id = e.evaluator_id
             ORDER BY e.created_at DESC"
        );
        sqlx::query_as::<_, EvaluationDetail>(&query)
            .fetch_all(pool)
            .await
    }

    /// List one evaluator's evaluations, newest first. Evaluator scope.
    pub async fn list_by_evaluator(
        pool: &PgPool,
        evaluator_id: DbId,
    ) -> Result<Vec<EvaluationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM evaluations e
             JOIN users u ON u.id = e.evaluator_id
             WHERE e.evaluator_id = $1
             ORDER BY e.created_at DESC"
        );
        sqlx::query_as::<_, EvaluationDetail>(&query)
            .bind(evaluator_id)
            .fetch_all(pool)
            .await
    }

    /// List evaluations of workflows the given user initiated. Restorer
    /// scope: a restorer reads the scores their own workflows received.
    pub async fn list_for_initiator(
        pool: &PgPool,
        initiator_id: DbId,
    ) -> Result<Vec<EvaluationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM evaluations e
             JOIN users u ON u.id = e.evaluator_id
             JOIN workflows w ON w.id = e.workflow_id
             WHERE w.initiator_id = $1 AND w.deleted_at IS NULL
             ORDER BY e.created_at DESC"
        );
        sqlx::query_as::<_, EvaluationDetail>(&query)
            .bind(initiator_id)
            .fetch_all(pool)
            .await
    }

    /// List one workflow's evaluations, newest first.
    pub async fn list_for_workflow(
        pool: &PgPool,
        workflow_id: EntityId,
    ) -> Result<Vec<EvaluationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM evaluations e
             JOIN users u ON u.id = e.evaluator_id
             WHERE e.workflow_id = $1
             ORDER BY e.created_at DESC"
        );
        sqlx::query_as::<_, EvaluationDetail>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// Hard delete. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM evaluations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
