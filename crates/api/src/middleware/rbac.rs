//! Role-based access control (RBAC) extractors.
//!
//! Coarse role gates for whole route groups. Per-entity ownership checks go
//! through `muralis_core::authz::is_allowed` inside the handlers; these
//! extractors only reject roles that could never pass it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use muralis_core::error::CoreError;
use muralis_core::roles::{ROLE_ADMIN, ROLE_EVALUATOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `evaluator` or `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireEvaluator(pub AuthUser);

impl FromRequestParts<AppState> for RequireEvaluator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_EVALUATOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Evaluator or Admin role required".into(),
            )));
        }
        Ok(RequireEvaluator(user))
    }
}
