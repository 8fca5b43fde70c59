pub mod admin;
pub mod auth;
pub mod email;
pub mod evaluation;
pub mod form;
pub mod health;
pub mod rollback;
pub mod workflow;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/me                             profile (get, update)
/// /auth/me/password                    change password
///
/// /email/send-code                     send verification code (public)
/// /email/verify                        check a code (public)
/// /email/register                      self-registration (public)
///
/// /uploads                             standalone file upload (POST)
///
/// /workflows                           list, create
/// /workflows/{id}                      get
/// /workflows/{id}/finalize             mark the accepted outcome (POST)
/// /workflows/{id}/forms                step history (GET)
/// /workflows/{id}/evaluations          evaluations of one workflow (GET)
/// /workflows/{id}/logs                 full audit trail (GET)
///
/// /forms                               submit a step form (POST, multipart)
/// /forms/{id}                          get
/// /forms/{id}/logs                     audit trail (GET)
///
/// /evaluations                         list, create (multipart)
/// /evaluations/{id}                    get, delete
///
/// /rollback-requests                   list, create (multipart)
/// /rollback-requests/{id}              get, delete
/// /rollback-requests/{id}/approve      resolve (POST, admin only)
///
/// /dashboard                           role-shaped aggregates (GET)
///
/// /system/privacy-agreement            agreement text (GET, public)
///
/// /admin/workflows                     unscoped list (GET)
/// /admin/workflows/{id}                corrective edit, delete (PUT, DELETE)
/// /admin/forms/{id}                    corrective edit, delete (PUT, DELETE)
/// /admin/users                         list, create (GET, POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and account management.
        .nest("/auth", auth::router())
        // Email verification and self-registration.
        .nest("/email", email::router())
        // Standalone upload endpoint for clients that stage files first.
        .route("/uploads", post(handlers::uploads::upload))
        // Workflow lifecycle.
        .nest("/workflows", workflow::router())
        .nest("/forms", form::router())
        .nest("/evaluations", evaluation::router())
        .nest("/rollback-requests", rollback::router())
        // Role-shaped dashboard.
        .route("/dashboard", get(handlers::dashboard::summary))
        // Public system configuration.
        .route(
            "/system/privacy-agreement",
            get(handlers::system::privacy_agreement),
        )
        // Administrative overrides.
        .nest("/admin", admin::router())
}
