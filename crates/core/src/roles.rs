//! Well-known role key constants.
//!
//! These must match the seed data in `20260301000001_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_RESTORER: &str = "restorer";
pub const ROLE_EVALUATOR: &str = "evaluator";

/// Role keys that may be chosen at self-registration. `admin` is excluded;
/// administrators are provisioned at bootstrap only.
pub const SELF_REGISTER_ROLES: &[&str] = &[ROLE_RESTORER, ROLE_EVALUATOR];
