//! Evaluation entity model and DTOs.

use muralis_core::types::{DbId, EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An evaluation row: one expert's scored review of a finished workflow.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Evaluation {
    pub id: DbId,
    pub workflow_id: EntityId,
    pub evaluator_id: DbId,
    pub score: i16,
    pub comment: Option<String>,
    pub evaluation_file: Option<String>,
    pub personnel_confirmation: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Evaluation row with the evaluator's name joined in, for read paths.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EvaluationDetail {
    pub id: DbId,
    pub workflow_id: EntityId,
    pub evaluator_id: DbId,
    pub evaluator_name: String,
    pub score: i16,
    pub comment: Option<String>,
    pub evaluation_file: Option<String>,
    pub personnel_confirmation: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new evaluation.
#[derive(Debug, Clone)]
pub struct CreateEvaluation {
    pub workflow_id: EntityId,
    pub evaluator_id: DbId,
    pub score: i16,
    pub comment: Option<String>,
    pub evaluation_file: Option<String>,
    pub personnel_confirmation: Option<String>,
}
