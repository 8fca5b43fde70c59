//! Form submission routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::form;
use crate::state::AppState;

/// Routes mounted at `/forms`.
///
/// ```text
/// POST /            -> submit (multipart)
/// GET  /{id}        -> get_by_id
/// GET  /{id}/logs   -> list_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(form::submit))
        .route("/{id}", get(form::get_by_id))
        .route("/{id}/logs", get(form::list_logs))
}
