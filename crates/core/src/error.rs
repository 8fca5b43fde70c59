//! Domain-level error taxonomy shared by the repository and API layers.

/// Domain error for lifecycle operations.
///
/// Every variant maps to a stable error kind at the HTTP boundary; internal
/// detail is never leaked beyond the variant's message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced entity is absent or soft-deleted.
    #[error("{entity} with id {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Input failed a domain validation rule (score range, malformed id, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A state-machine precondition was violated (re-finalize, duplicate
    /// evaluation, deleting a workflow's only form, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role/ownership check failed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An upstream collaborator (blob store, SMTP) failed.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Anything unexpected. The message is logged, not returned to clients.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with a displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
