//! HTTP handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod email;
pub mod evaluation;
pub mod form;
pub mod rollback;
pub mod system;
pub mod uploads;
pub mod workflow;

use muralis_core::authz::{is_allowed, Action, Ownership};
use muralis_core::error::CoreError;
use muralis_core::types::DbId;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;

/// Ownership predicate for the authorization table: does the acting user
/// own the entity (initiated the workflow, filed the request, authored the
/// evaluation)?
fn ownership(user: &AuthUser, owner_id: DbId) -> Ownership {
    if user.user_id == owner_id {
        Ownership::Own
    } else {
        Ownership::Other
    }
}

/// Consult the policy table, mapping a denial to 403.
fn authorize(user: &AuthUser, action: Action, ownership: Ownership) -> Result<(), AppError> {
    if is_allowed(&user.role, action, ownership) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not permitted for this role".into(),
        )))
    }
}
