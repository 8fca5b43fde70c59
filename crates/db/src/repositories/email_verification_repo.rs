//! Repository for the `email_verifications` table.
//!
//! One active code per address; re-sending replaces the row and resets the
//! attempt counter. Expiry and attempt limits come from `muralis_core::email`
//! and are enforced by the caller against the fetched row.

use muralis_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::email_verification::EmailVerification;

const COLUMNS: &str = "id, email, code, attempts, expires_at, created_at";

/// Storage for pending verification codes.
pub struct EmailVerificationRepo;

impl EmailVerificationRepo {
    /// Store a fresh code for the address, replacing any previous one.
    pub async fn upsert(
        pool: &PgPool,
        email: &str,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<EmailVerification, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_verifications (email, code, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_email_verifications_email
             DO UPDATE SET code = $2, attempts = 0, expires_at = $3, created_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(email)
            .bind(code)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Fetch the pending code for an address.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<EmailVerification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_verifications WHERE email = $1");
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Record a failed attempt, returning the new attempt count.
    pub async fn increment_attempts(pool: &PgPool, email: &str) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE email_verifications SET attempts = attempts + 1
             WHERE email = $1
             RETURNING attempts",
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Remove the code once consumed (or exhausted).
    pub async fn delete(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM email_verifications WHERE email = $1")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(())
    }
}
