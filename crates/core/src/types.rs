/// Database primary keys for users, step logs, evaluations, and rollback
/// requests are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Workflows and forms are keyed by UUID v4.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
