//! Aggregate rows backing the dashboard endpoint.

use serde::Serialize;
use sqlx::FromRow;

/// Workflow count for one status value.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Headline totals across the visible data set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardTotals {
    pub workflows: i64,
    pub forms: i64,
    pub evaluations: i64,
    pub pending_rollbacks: i64,
}
