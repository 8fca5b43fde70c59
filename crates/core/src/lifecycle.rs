//! Workflow lifecycle state machine.
//!
//! Encodes the status transitions enforced across workflows, forms, step
//! logs, and rollback requests:
//!
//! ```text
//! draft --submit--> running --submit--> running
//! running --finalize--> finished (is_finalized = true)
//! finished --approved rollback--> running (is_finalized = false)
//! ```
//!
//! `paused` and `revoked` are reachable only through the admin status edit;
//! no business operation leads in, and `revoked` is terminal.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Workflow status
// ---------------------------------------------------------------------------

/// Status of a [`Workflow`] as stored in the `workflows.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Draft,
    Running,
    Paused,
    Finished,
    Revoked,
}

impl WorkflowStatus {
    /// The column value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::Running => "running",
            WorkflowStatus::Paused => "paused",
            WorkflowStatus::Finished => "finished",
            WorkflowStatus::Revoked => "revoked",
        }
    }

    /// Parse a column value. Returns `None` for unknown strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(WorkflowStatus::Draft),
            "running" => Some(WorkflowStatus::Running),
            "paused" => Some(WorkflowStatus::Paused),
            "finished" => Some(WorkflowStatus::Finished),
            "revoked" => Some(WorkflowStatus::Revoked),
            _ => None,
        }
    }

    /// Whether a new form may be submitted in this status.
    pub fn accepts_submission(self) -> bool {
        matches!(self, WorkflowStatus::Draft | WorkflowStatus::Running)
    }

    /// Status after a successful form submission: the first submission moves
    /// a draft to running, later submissions leave the status unchanged.
    pub fn after_submit(self) -> Self {
        match self {
            WorkflowStatus::Draft => WorkflowStatus::Running,
            other => other,
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a workflow may be finalized.
///
/// Finalize is only defined out of `running` with `is_finalized = false`:
/// a draft has no accepted outcome to mark, and a finished workflow must go
/// through an approved rollback before another form can become final.
pub fn check_finalize(status: WorkflowStatus, is_finalized: bool) -> Result<(), &'static str> {
    if is_finalized {
        return Err("workflow is already finalized");
    }
    match status {
        WorkflowStatus::Running => Ok(()),
        WorkflowStatus::Draft => Err("workflow has no submitted forms to finalize"),
        WorkflowStatus::Paused => Err("workflow is paused"),
        WorkflowStatus::Finished => Err("workflow is already finished"),
        WorkflowStatus::Revoked => Err("workflow is revoked"),
    }
}

/// Check an admin status override. The only refused edit is moving a
/// workflow out of `revoked`, which has no defined exit transition.
pub fn check_admin_status_edit(
    current: WorkflowStatus,
    next: WorkflowStatus,
) -> Result<(), &'static str> {
    if current == WorkflowStatus::Revoked && next != WorkflowStatus::Revoked {
        return Err("no transition is defined out of revoked");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rollback request status
// ---------------------------------------------------------------------------

/// Status of a rollback request. `approved` and `rejected` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackStatus {
    Pending,
    Approved,
    Rejected,
}

impl RollbackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RollbackStatus::Pending => "pending",
            RollbackStatus::Approved => "approved",
            RollbackStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RollbackStatus::Pending),
            "approved" => Some(RollbackStatus::Approved),
            "rejected" => Some(RollbackStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, RollbackStatus::Approved | RollbackStatus::Rejected)
    }
}

impl std::fmt::Display for RollbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Step log actions
// ---------------------------------------------------------------------------

/// Known actions for the append-only `step_logs` audit trail.
pub mod step_actions {
    pub const SUBMIT: &str = "submit";
    pub const ROLLBACK: &str = "rollback";
    pub const FINALIZE: &str = "finalize";
    pub const REVOKE: &str = "revoke";
    pub const ADMIN_UPDATE: &str = "admin_update";
    pub const ADMIN_DELETE: &str = "admin_delete";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            WorkflowStatus::Draft,
            WorkflowStatus::Running,
            WorkflowStatus::Paused,
            WorkflowStatus::Finished,
            WorkflowStatus::Revoked,
        ] {
            assert_eq!(WorkflowStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WorkflowStatus::parse("archived"), None);
    }

    #[test]
    fn first_submission_starts_the_workflow() {
        assert_eq!(
            WorkflowStatus::Draft.after_submit(),
            WorkflowStatus::Running
        );
        assert_eq!(
            WorkflowStatus::Running.after_submit(),
            WorkflowStatus::Running
        );
    }

    #[test]
    fn submissions_only_in_draft_or_running() {
        assert!(WorkflowStatus::Draft.accepts_submission());
        assert!(WorkflowStatus::Running.accepts_submission());
        assert!(!WorkflowStatus::Paused.accepts_submission());
        assert!(!WorkflowStatus::Finished.accepts_submission());
        assert!(!WorkflowStatus::Revoked.accepts_submission());
    }

    #[test]
    fn finalize_requires_running_and_not_finalized() {
        assert!(check_finalize(WorkflowStatus::Running, false).is_ok());
        assert!(check_finalize(WorkflowStatus::Running, true).is_err());
        assert!(check_finalize(WorkflowStatus::Draft, false).is_err());
        assert!(check_finalize(WorkflowStatus::Finished, false).is_err());
        assert!(check_finalize(WorkflowStatus::Finished, true).is_err());
    }

    #[test]
    fn revoked_is_terminal_for_admin_edits() {
        assert!(check_admin_status_edit(WorkflowStatus::Revoked, WorkflowStatus::Running).is_err());
        assert!(check_admin_status_edit(WorkflowStatus::Revoked, WorkflowStatus::Revoked).is_ok());
        assert!(check_admin_status_edit(WorkflowStatus::Running, WorkflowStatus::Paused).is_ok());
        assert!(check_admin_status_edit(WorkflowStatus::Paused, WorkflowStatus::Running).is_ok());
    }

    #[test]
    fn rollback_terminal_states() {
        assert!(!RollbackStatus::Pending.is_terminal());
        assert!(RollbackStatus::Approved.is_terminal());
        assert!(RollbackStatus::Rejected.is_terminal());
    }
}
