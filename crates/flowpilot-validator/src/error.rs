use thiserror::Error;

use crate::violation::Violation;

/// Aggregate of every violation found by one validation pass.
///
/// Returned only when at least one violation is fatal. Warnings found in the
/// same pass are kept alongside the errors, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid workflow: {}", join_messages(.violations))]
pub struct ValidationError {
  violations: Vec<Violation>,
}

impl ValidationError {
  pub(crate) fn new(violations: Vec<Violation>) -> Self {
    Self { violations }
  }

  pub fn violations(&self) -> &[Violation] {
    &self.violations
  }

  /// Only the fatal violations.
  pub fn errors(&self) -> impl Iterator<Item = &Violation> {
    self.violations.iter().filter(|v| v.is_error())
  }

  pub fn into_violations(self) -> Vec<Violation> {
    self.violations
  }
}

fn join_messages(violations: &[Violation]) -> String {
  violations
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}
