//! Runtime errors.

use flowpilot_validator::ValidationError;

use crate::coordinator::RunState;

/// Failure reported by an [`ActionExecutor`](crate::ActionExecutor).
///
/// Never escalated: the coordinator records it as a failed node result and
/// moves on to the next node.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
  /// The action could not be performed.
  #[error("{0}")]
  Failed(String),

  /// The action did not finish within the per-node timeout.
  #[error("node '{node_id}' timed out after {timeout_ms}ms")]
  Timeout { node_id: String, timeout_ms: u64 },
}

impl ActionError {
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed(message.into())
  }
}

/// Why `start` refused to begin a run.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
  /// A run is already in flight on this coordinator.
  #[error("coordinator is busy ({state})")]
  Busy { state: RunState },

  /// A stopped run is still finishing the node it was executing.
  #[error("run '{run_id}' is stopping")]
  Stopping { run_id: String },

  /// The workflow has fatal structural violations.
  #[error(transparent)]
  Invalid(#[from] ValidationError),
}

/// Errors surfaced while joining a run.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
  /// The worker task panicked or was aborted.
  #[error("execution worker failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}
