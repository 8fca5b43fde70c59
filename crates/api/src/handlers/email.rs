//! Handlers for email verification and self-registration.
//!
//! Registration is restorer/evaluator only and requires a 6-digit code
//! emailed to the address beforehand. Codes expire and allow a bounded
//! number of attempts; both limits live in `muralis_core::email`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use muralis_core::email::{
    generate_code, is_valid_email, is_well_formed_code, normalize_email, CODE_EXPIRY_MINUTES,
    MAX_VERIFY_ATTEMPTS,
};
use muralis_core::error::CoreError;
use muralis_core::roles::SELF_REGISTER_ROLES;
use muralis_db::models::user::{CreateUser, UserResponse};
use muralis_db::repositories::{EmailVerificationRepo, RoleRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /email/send-code`.
#[derive(Debug, Deserialize)]
pub struct SendVerificationRequest {
    pub email: String,
}

/// Request body for `POST /email/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// Request body for `POST /email/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub code: String,
    pub username: String,
    pub password: String,
    pub full_name: String,
    /// `restorer` or `evaluator`; admins are provisioned at bootstrap.
    pub role: String,
    pub phone: Option<String>,
    pub unit: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/email/send-code
///
/// Generate and email a fresh verification code. Replaces any previous code
/// for the address.
pub async fn send_verification(
    State(state): State<AppState>,
    Json(input): Json<SendVerificationRequest>,
) -> AppResult<Json<DataResponse<&'static str>>> {
    let email = normalize_email(&input.email);
    if !is_valid_email(&email) {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid email address".into(),
        )));
    }

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let mailer = state.mailer.as_ref().ok_or_else(|| {
        AppError::Core(CoreError::Upstream(
            "Email delivery is not configured".into(),
        ))
    })?;

    let code = generate_code();
    let expires_at = Utc::now() + Duration::minutes(CODE_EXPIRY_MINUTES);

    // The code is stored before sending so a slow SMTP round-trip cannot
    // race a concurrent resend into an inconsistent state.
    EmailVerificationRepo::upsert(&state.pool, &email, &code, expires_at).await?;

    mailer
        .send_verification_code(&email, &code)
        .await
        .map_err(|e| AppError::Core(CoreError::Upstream(format!("Email send failed: {e}"))))?;

    Ok(Json(DataResponse { data: "sent" }))
}

/// POST /api/v1/email/verify
///
/// Check a code without consuming it. Wrong codes count against the attempt
/// limit.
pub async fn verify_code(
    State(state): State<AppState>,
    Json(input): Json<VerifyCodeRequest>,
) -> AppResult<Json<DataResponse<&'static str>>> {
    let email = normalize_email(&input.email);
    check_code(&state, &email, &input.code).await?;
    Ok(Json(DataResponse { data: "verified" }))
}

/// POST /api/v1/email/register
///
/// Create a restorer or evaluator account. Consumes the verification code.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let email = normalize_email(&input.email);
    check_code(&state, &email, &input.code).await?;

    if !SELF_REGISTER_ROLES.contains(&input.role.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Role '{}' is not open for registration",
            input.role
        ))));
    }
    if input.username.trim().is_empty() || input.full_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username and full name are required".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is already taken".into(),
        )));
    }

    let role = RoleRepo::find_by_key(&state.pool, &input.role)
        .await?
        .ok_or_else(|| CoreError::not_found("Role", &input.role))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // The uq_users_username / uq_users_email constraints backstop the
    // pre-checks above under concurrent registration.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            password_hash,
            full_name: input.full_name,
            role_id: role.id,
            email: Some(email.clone()),
            phone: input.phone,
            unit: input.unit,
        },
    )
    .await?;

    EmailVerificationRepo::delete(&state.pool, &email).await?;

    tracing::info!(user_id = user.id, role = %user.role_key, "User registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate a submitted code against the stored one, enforcing expiry and
/// the attempt limit.
async fn check_code(state: &AppState, email: &str, code: &str) -> Result<(), AppError> {
    if !is_well_formed_code(code) {
        return Err(AppError::Core(CoreError::Validation(
            "Verification code must be 6 digits".into(),
        )));
    }

    let Some(pending) = EmailVerificationRepo::find_by_email(&state.pool, email).await? else {
        return Err(AppError::Core(CoreError::Validation(
            "No verification code was requested for this address".into(),
        )));
    };

    if pending.expires_at < Utc::now() {
        EmailVerificationRepo::delete(&state.pool, email).await?;
        return Err(AppError::Core(CoreError::Validation(
            "Verification code has expired".into(),
        )));
    }
    if pending.attempts >= MAX_VERIFY_ATTEMPTS {
        EmailVerificationRepo::delete(&state.pool, email).await?;
        return Err(AppError::Core(CoreError::Validation(
            "Too many failed attempts; request a new code".into(),
        )));
    }

    if pending.code != code {
        EmailVerificationRepo::increment_attempts(&state.pool, email).await?;
        return Err(AppError::Core(CoreError::Validation(
            "Incorrect verification code".into(),
        )));
    }

    Ok(())
}
