//! Flowpilot Validator
//!
//! Structural checks over a [`Workflow`](flowpilot_workflow::Workflow).
//!
//! [`validate`] runs every check and returns the full, ordered list of
//! [`Violation`]s so a caller can show all problems at once. [`check`] is the
//! gate used before running or saving a workflow: it fails with a
//! [`ValidationError`] carrying that list when any violation is fatal, and
//! passes warnings through otherwise.

mod error;
mod validator;
mod violation;

pub use error::ValidationError;
pub use validator::{check, is_valid, reachable_from_start, validate};
pub use violation::{Severity, Violation};
