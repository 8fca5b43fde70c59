//! Startup provisioning of the administrator account.
//!
//! Administrators cannot self-register; the first admin is created at boot
//! from `ADMIN_USERNAME`/`ADMIN_PASSWORD`. The hash cannot be produced in a
//! SQL migration, so this runs in the binary after migrations.

use muralis_core::roles::ROLE_ADMIN;
use muralis_db::models::user::CreateUser;
use muralis_db::repositories::{RoleRepo, UserRepo};
use muralis_db::DbPool;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Default username when `ADMIN_USERNAME` is not set.
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Ensure at least one admin account exists.
///
/// No-op when an admin already exists. Otherwise requires `ADMIN_PASSWORD`
/// to be set and creates the account.
pub async fn ensure_admin_user(pool: &DbPool) -> AppResult<()> {
    let existing = UserRepo::count_by_role_key(pool, ROLE_ADMIN).await?;
    if existing > 0 {
        return Ok(());
    }

    let username =
        std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string());
    let password = std::env::var("ADMIN_PASSWORD").map_err(|_| {
        AppError::InternalError(
            "No admin account exists and ADMIN_PASSWORD is not set".to_string(),
        )
    })?;

    let role = RoleRepo::find_by_key(pool, ROLE_ADMIN)
        .await?
        .ok_or_else(|| AppError::InternalError("admin role missing from seed data".into()))?;

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.clone(),
            password_hash,
            full_name: "Administrator".to_string(),
            role_id: role.id,
            email: None,
            phone: None,
            unit: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %username, "Bootstrap admin account created");
    Ok(())
}
