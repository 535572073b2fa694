use thiserror::Error;

/// How a violation affects the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
  /// Blocks execution and saving.
  Error,
  /// Reported, but does not block.
  Warning,
}

/// A structural problem found in a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
  /// `id` or `name` is empty.
  #[error("workflow {field} must not be empty")]
  MissingRequiredField { field: &'static str },

  #[error("workflow must have at least one Start node")]
  MissingStartNode,

  #[error("workflow must have only one Start node (found {count})")]
  MultipleStartNodes { count: usize },

  #[error("workflow has no End node")]
  MissingEndNode,

  #[error("workflow contains a cycle")]
  Cycle,

  /// Node not reachable from the Start node.
  #[error("disconnected node: {kind} ({node_id})")]
  DisconnectedNode { node_id: String, kind: String },

  /// Connection whose source or target is not a node of the workflow.
  #[error("connection '{connection_id}' references a missing node")]
  DanglingConnection { connection_id: String },
}

impl Violation {
  pub fn severity(&self) -> Severity {
    match self {
      Violation::MissingEndNode => Severity::Warning,
      _ => Severity::Error,
    }
  }

  pub fn is_error(&self) -> bool {
    self.severity() == Severity::Error
  }

  pub fn is_warning(&self) -> bool {
    self.severity() == Severity::Warning
  }
}
