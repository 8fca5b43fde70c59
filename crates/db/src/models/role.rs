//! Role entity model.

use muralis_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    /// Stable key consulted by the authorization table (`admin`, `restorer`,
    /// `evaluator`).
    pub key: String,
    /// Human-readable name.
    pub name: String,
    pub created_at: Timestamp,
}
