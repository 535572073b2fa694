use std::time::Duration;

/// Configuration for the execution coordinator.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
  /// Upper bound for a single node's action. `None` lets a node run for as
  /// long as its executor takes.
  pub node_timeout: Option<Duration>,
}

impl CoordinatorConfig {
  pub fn with_node_timeout(mut self, timeout: Duration) -> Self {
    self.node_timeout = Some(timeout);
    self
  }
}
