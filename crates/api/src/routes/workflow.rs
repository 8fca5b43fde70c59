//! Workflow lifecycle routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workflow;
use crate::state::AppState;

/// Routes mounted at `/workflows`.
///
/// ```text
/// GET  /                   -> list (role-scoped, ?status=)
/// POST /                   -> create
/// GET  /{id}               -> get_by_id
/// POST /{id}/finalize      -> finalize
/// GET  /{id}/forms         -> list_forms
/// GET  /{id}/evaluations   -> list_evaluations
/// GET  /{id}/logs          -> list_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(workflow::list).post(workflow::create))
        .route("/{id}", get(workflow::get_by_id))
        .route("/{id}/finalize", post(workflow::finalize))
        .route("/{id}/forms", get(workflow::list_forms))
        .route("/{id}/evaluations", get(workflow::list_evaluations))
        .route("/{id}/logs", get(workflow::list_logs))
}
