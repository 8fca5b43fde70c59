//! Email verification and self-registration routes.

use axum::routing::post;
use axum::Router;

use crate::handlers::email;
use crate::state::AppState;

/// Routes mounted at `/email`. All three are public: they run before the
/// caller has an account.
///
/// ```text
/// POST /send-code  -> send_verification
/// POST /verify     -> verify_code
/// POST /register   -> register
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-code", post(email::send_verification))
        .route("/verify", post(email::verify_code))
        .route("/register", post(email::register))
}
