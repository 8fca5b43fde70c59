//! Administrative routes. Role enforcement happens in the handlers via
//! [`RequireAdmin`](crate::middleware::rbac::RequireAdmin).

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /workflows        -> list_workflows (unscoped, ?status=)
/// PUT    /workflows/{id}   -> update_workflow
/// DELETE /workflows/{id}   -> delete_workflow
/// PUT    /forms/{id}       -> update_form
/// DELETE /forms/{id}       -> delete_form
/// GET    /users            -> list_users
/// POST   /users            -> create_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/workflows", get(admin::list_workflows))
        .route(
            "/workflows/{id}",
            put(admin::update_workflow).delete(admin::delete_workflow),
        )
        .route(
            "/forms/{id}",
            put(admin::update_form).delete(admin::delete_form),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
}
