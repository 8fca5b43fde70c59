//! Repository for the `roles` table.

use muralis_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::Role;

const COLUMNS: &str = "id, key, name, created_at";

/// Read operations for the fixed role set.
pub struct RoleRepo;

impl RoleRepo {
    /// List all roles, ordered by id.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// Find a role by its stable key (`admin`, `restorer`, `evaluator`).
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE key = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
