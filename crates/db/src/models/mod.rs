//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Where the API joins in user names, a `*Detail` struct for read paths
//!
//! Relationships are plain foreign-key id fields; read-side joins resolve
//! names, so there is no in-memory object graph.

pub mod dashboard;
pub mod email_verification;
pub mod evaluation;
pub mod form;
pub mod role;
pub mod rollback;
pub mod step_log;
pub mod system_config;
pub mod user;
pub mod workflow;
