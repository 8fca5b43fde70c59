//! Repository for the `users` table.
//!
//! The `User` model carries the joined role key, so every query here goes
//! through the `users JOIN roles` projection.

use muralis_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateProfile, User};

/// Column list for the users-with-role projection.
const COLUMNS: &str = "u.id, u.username, u.password_hash, u.full_name, u.role_id, \
    r.key AS role_key, u.email, u.phone, u.unit, u.is_active, \
    u.created_at, u.updated_at, u.deleted_at";

/// CRUD operations for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "WITH inserted AS (
                INSERT INTO users (username, password_hash, full_name, role_id, email, phone, unit)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
             )
             SELECT {COLUMNS} FROM inserted u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(input.role_id)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.unit)
            .fetch_one(pool)
            .await
    }

    /// Find an active, non-deleted user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.id = $1 AND u.deleted_at IS NULL"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-deleted user by username. Used by login.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.username = $1 AND u.deleted_at IS NULL"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-deleted user by email. Used to reject duplicate
    /// registrations before the unique constraint fires.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.email = $1 AND u.deleted_at IS NULL"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all non-deleted users, newest first. Admin user management.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.deleted_at IS NULL
             ORDER BY u.created_at DESC"
        );
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Apply a profile update, returning the updated row.
    ///
    /// Missing fields keep their current value.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "WITH updated AS (
                UPDATE users SET
                    full_name = COALESCE($2, full_name),
                    email = COALESCE($3, email),
                    phone = COALESCE($4, phone),
                    unit = COALESCE($5, unit),
                    updated_at = now()
                WHERE id = $1 AND deleted_at IS NULL
                RETURNING *
             )
             SELECT {COLUMNS} FROM updated u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.unit)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored password hash.
    pub async fn set_password_hash(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count users holding the given role. Used by the startup admin seed.
    pub async fn count_by_role_key(pool: &PgPool, role_key: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM users u JOIN roles r ON r.id = u.role_id
             WHERE r.key = $1 AND u.deleted_at IS NULL",
        )
        .bind(role_key)
        .fetch_one(pool)
        .await
    }
}
