//! Domain rules for the mural-restoration workflow system.
//!
//! This crate has no internal dependencies so the API layer, the repository
//! layer, and any future CLI tooling can all share the same error taxonomy,
//! authorization table, and lifecycle state machine.

pub mod authz;
pub mod email;
pub mod error;
pub mod evaluation;
pub mod lifecycle;
pub mod roles;
pub mod types;
