//! Email verification code state, one active row per address.

use muralis_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
    pub id: DbId,
    pub email: String,
    pub code: String,
    pub attempts: i32,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
