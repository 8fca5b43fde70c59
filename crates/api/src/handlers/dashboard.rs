//! Role-shaped dashboard aggregates.

use axum::extract::{Query, State};
use axum::Json;
use muralis_core::roles::{ROLE_ADMIN, ROLE_EVALUATOR};
use muralis_db::models::dashboard::{DashboardTotals, StatusCount};
use muralis_db::models::step_log::StepLogDetail;
use muralis_db::repositories::{DashboardRepo, StepLogRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_ACTIVITY_LIMIT: i64 = 20;
const MAX_ACTIVITY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub activity_limit: Option<i64>,
}

/// Dashboard payload. Which sections are populated depends on the caller's
/// role: admins see global totals, restorers their own, evaluators their
/// scoring backlog.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<DashboardTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_counts: Option<Vec<StatusCount>>,
    /// Finished workflows over all non-deleted workflows, in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_activity: Option<Vec<StepLogDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluations_submitted: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluations_pending: Option<i64>,
}

fn completion_rate(counts: &[StatusCount]) -> f64 {
    let total: i64 = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return 0.0;
    }
    let finished = counts
        .iter()
        .find(|c| c.status == "finished")
        .map_or(0, |c| c.count);
    finished as f64 / total as f64
}

/// GET /api/v1/dashboard
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DataResponse<DashboardResponse>>> {
    let limit = query
        .activity_limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);

    let response = if user.role == ROLE_EVALUATOR {
        let submitted = DashboardRepo::evaluation_count_for(&state.pool, user.user_id).await?;
        let pending =
            DashboardRepo::pending_evaluation_count_for(&state.pool, user.user_id).await?;
        DashboardResponse {
            totals: None,
            status_counts: None,
            completion_rate: None,
            recent_activity: None,
            evaluations_submitted: Some(submitted),
            evaluations_pending: Some(pending),
        }
    } else {
        // Admins see everything; restorers the same shape scoped to the
        // workflows they initiated.
        let initiator = if user.role == ROLE_ADMIN {
            None
        } else {
            Some(user.user_id)
        };
        let totals = DashboardRepo::totals(&state.pool, initiator).await?;
        let counts = DashboardRepo::status_counts(&state.pool, initiator).await?;
        let activity = StepLogRepo::recent_activity(&state.pool, initiator, limit).await?;
        DashboardResponse {
            completion_rate: Some(completion_rate(&counts)),
            totals: Some(totals),
            status_counts: Some(counts),
            recent_activity: Some(activity),
            evaluations_submitted: None,
            evaluations_pending: None,
        }
    };

    Ok(Json(DataResponse { data: response }))
}
