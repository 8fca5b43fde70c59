//! Repository layer: one zero-sized struct per table (or per lifecycle
//! aggregate), all methods taking an explicit `&PgPool`.
//!
//! Lifecycle mutations that must be atomic (form submission, finalize,
//! rollback resolution, admin deletes) run their reads, writes, and step-log
//! inserts inside a single transaction, holding a `FOR UPDATE` lock on the
//! workflow row so step numbers are allocated serially per workflow.

pub mod dashboard_repo;
pub mod email_verification_repo;
pub mod evaluation_repo;
pub mod form_repo;
pub mod role_repo;
pub mod rollback_repo;
pub mod step_log_repo;
pub mod system_config_repo;
pub mod user_repo;
pub mod workflow_repo;

pub use dashboard_repo::DashboardRepo;
pub use email_verification_repo::EmailVerificationRepo;
pub use evaluation_repo::EvaluationRepo;
pub use form_repo::{DeleteFormOutcome, FormRepo, SubmitOutcome};
pub use role_repo::RoleRepo;
pub use rollback_repo::{ResolveOutcome, RollbackRepo};
pub use step_log_repo::StepLogRepo;
pub use system_config_repo::SystemConfigRepo;
pub use user_repo::UserRepo;
pub use workflow_repo::{
    DeleteWorkflowOutcome, FinalizeOutcome, UpdateWorkflowOutcome, WorkflowRepo,
};
