//! Repository for the `system_configs` key/value table.

use sqlx::PgPool;

use crate::models::system_config::SystemConfig;

const COLUMNS: &str = "key, value, description, updated_at";

pub struct SystemConfigRepo;

impl SystemConfigRepo {
    /// Fetch a configuration entry by key.
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<SystemConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_configs WHERE key = $1");
        sqlx::query_as::<_, SystemConfig>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }
}
