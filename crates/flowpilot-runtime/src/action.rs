//! The per-node action capability.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flowpilot_workflow::Node;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// What an executor reports for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
  pub success: bool,
  pub message: String,
  pub duration_ms: u64,
}

impl ActionOutcome {
  pub fn success(message: impl Into<String>, duration_ms: u64) -> Self {
    Self {
      success: true,
      message: message.into(),
      duration_ms,
    }
  }

  pub fn failure(message: impl Into<String>, duration_ms: u64) -> Self {
    Self {
      success: false,
      message: message.into(),
      duration_ms,
    }
  }
}

/// Performs the effect of a single node, e.g. a click in a browser session.
///
/// Implementations interpret `node.properties` according to `node.kind`.
/// Both `Ok(ActionOutcome { success: false, .. })` and `Err(_)` are recorded as
/// a failed node; neither aborts the run.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
  async fn execute(&self, node: &Node) -> Result<ActionOutcome, ActionError>;
}

#[async_trait]
impl<T: ActionExecutor + ?Sized> ActionExecutor for Arc<T> {
  async fn execute(&self, node: &Node) -> Result<ActionOutcome, ActionError> {
    (**self).execute(node).await
  }
}

/// Bounds every action of an inner executor by a fixed timeout.
///
/// An action that runs past the deadline is dropped and reported as
/// [`ActionError::Timeout`].
pub struct TimeoutExecutor {
  inner: Arc<dyn ActionExecutor>,
  timeout: Duration,
}

impl TimeoutExecutor {
  pub fn new(inner: Arc<dyn ActionExecutor>, timeout: Duration) -> Self {
    Self { inner, timeout }
  }
}

#[async_trait]
impl ActionExecutor for TimeoutExecutor {
  async fn execute(&self, node: &Node) -> Result<ActionOutcome, ActionError> {
    match tokio::time::timeout(self.timeout, self.inner.execute(node)).await {
      Ok(result) => result,
      Err(_) => Err(ActionError::Timeout {
        node_id: node.id.clone(),
        timeout_ms: self.timeout.as_millis() as u64,
      }),
    }
  }
}
