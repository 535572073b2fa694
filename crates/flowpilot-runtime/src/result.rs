use flowpilot_workflow::{Node, NodeKind};
use serde::{Deserialize, Serialize};

use crate::action::ActionOutcome;

/// Outcome of one node within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
  pub node_id: String,
  #[serde(rename = "type")]
  pub kind: NodeKind,
  pub success: bool,
  pub message: String,
  pub duration_ms: u64,
}

impl NodeResult {
  pub(crate) fn from_outcome(node: &Node, outcome: ActionOutcome) -> Self {
    Self {
      node_id: node.id.clone(),
      kind: node.kind.clone(),
      success: outcome.success,
      message: outcome.message,
      duration_ms: outcome.duration_ms,
    }
  }

  pub(crate) fn failed(node: &Node, message: String, duration_ms: u64) -> Self {
    Self {
      node_id: node.id.clone(),
      kind: node.kind.clone(),
      success: false,
      message,
      duration_ms,
    }
  }
}

/// Totals for a finished or stopped run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
  pub run_id: String,
  pub workflow_id: String,
  /// Nodes reachable from the Start node.
  pub total: usize,
  pub succeeded: usize,
  pub failed: usize,
  pub elapsed_ms: u64,
  /// The run was stopped before every reachable node executed.
  pub cancelled: bool,
}

impl RunSummary {
  /// Number of nodes that actually executed.
  pub fn executed(&self) -> usize {
    self.succeeded + self.failed
  }

  pub fn is_success(&self) -> bool {
    !self.cancelled && self.failed == 0
  }
}
