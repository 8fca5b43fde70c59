//! Evaluation routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::evaluation;
use crate::state::AppState;

/// Routes mounted at `/evaluations`.
///
/// ```text
/// GET    /        -> list (role-scoped)
/// POST   /        -> create (multipart, evaluator or admin)
/// GET    /{id}    -> get_by_id
/// DELETE /{id}    -> delete (24h window for evaluators)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(evaluation::list).post(evaluation::create))
        .route(
            "/{id}",
            get(evaluation::get_by_id).delete(evaluation::delete),
        )
}
