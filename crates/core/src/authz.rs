//! Authorization policy table.
//!
//! Every mutating operation and every list query consults this module instead
//! of scattering role checks across endpoints, so mutation authorization and
//! list filtering cannot drift apart. The table is keyed by
//! `(role, action, ownership)`; handlers compute the ownership predicate
//! (initiator / requester / evaluator match) and pass it in.

use crate::roles::{ROLE_ADMIN, ROLE_EVALUATOR, ROLE_RESTORER};

/// A lifecycle or administrative operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateWorkflow,
    ViewWorkflow,
    SubmitForm,
    FinalizeWorkflow,
    RequestRollback,
    ResolveRollback,
    ViewRollback,
    DeleteRollback,
    CreateEvaluation,
    ViewEvaluation,
    DeleteEvaluation,
    AdminUpdateWorkflow,
    AdminDeleteWorkflow,
    AdminUpdateForm,
    AdminDeleteForm,
    ManageUsers,
}

/// Whether the acting user owns the entity being acted on.
///
/// "Owns" means: initiated the workflow, requested the rollback, or authored
/// the evaluation. Operations that create a new entity always pass `Own`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Own,
    Other,
}

/// Decide whether `role` may perform `action` given the ownership predicate.
///
/// Admins may act on any entity unconditionally. Unknown roles are denied
/// everything.
pub fn is_allowed(role: &str, action: Action, ownership: Ownership) -> bool {
    if role == ROLE_ADMIN {
        return true;
    }
    let own = ownership == Ownership::Own;
    match role {
        ROLE_RESTORER => match action {
            Action::CreateWorkflow => true,
            Action::ViewWorkflow
            | Action::SubmitForm
            | Action::FinalizeWorkflow
            | Action::RequestRollback
            | Action::ViewRollback
            | Action::DeleteRollback => own,
            // Restorers may read evaluations of their own workflows.
            Action::ViewEvaluation => own,
            _ => false,
        },
        ROLE_EVALUATOR => match action {
            // Evaluators review workflows they did not initiate.
            Action::ViewWorkflow => true,
            Action::CreateEvaluation => true,
            Action::ViewEvaluation | Action::DeleteEvaluation => own,
            _ => false,
        },
        _ => false,
    }
}

/// A listable resource whose result set is role-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Workflows,
    Evaluations,
    RollbackRequests,
}

/// How a list query must be filtered for a given role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// No ownership filter.
    All,
    /// Only rows owned by the acting user (initiator / requester / evaluator).
    Own,
    /// Only rows attached to workflows the acting user initiated.
    OwnWorkflows,
}

/// Resolve the list scope for `role` over `resource`.
///
/// Mirrors [`is_allowed`]: a role that cannot view someone else's entity must
/// not see it in a list either.
pub fn list_scope(role: &str, resource: Resource) -> ListScope {
    if role == ROLE_ADMIN {
        return ListScope::All;
    }
    match (role, resource) {
        (ROLE_RESTORER, Resource::Workflows) => ListScope::Own,
        (ROLE_RESTORER, Resource::Evaluations) => ListScope::OwnWorkflows,
        (ROLE_RESTORER, Resource::RollbackRequests) => ListScope::Own,
        // Evaluators browse all workflows (they pick finished ones to score)
        // but only their own evaluations, and never rollback requests.
        (ROLE_EVALUATOR, Resource::Workflows) => ListScope::All,
        (ROLE_EVALUATOR, Resource::Evaluations) => ListScope::Own,
        (ROLE_EVALUATOR, Resource::RollbackRequests) => ListScope::Own,
        _ => ListScope::Own,
    }
}
