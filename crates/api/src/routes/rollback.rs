//! Rollback request routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rollback;
use crate::state::AppState;

/// Routes mounted at `/rollback-requests`.
///
/// ```text
/// GET    /               -> list (role-scoped, ?status=)
/// POST   /               -> create (multipart)
/// GET    /{id}           -> get_by_id
/// DELETE /{id}           -> delete (requester while pending, or admin)
/// POST   /{id}/approve   -> resolve (admin only, {"approve": bool})
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rollback::list).post(rollback::create))
        .route("/{id}", get(rollback::get_by_id).delete(rollback::delete))
        .route("/{id}/approve", post(rollback::resolve))
}
