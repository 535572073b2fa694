use serde::{Deserialize, Serialize};

/// A directed link from an output port of one node to an input port of another.
///
/// Endpoints are node ids, not references, so a connection may outlive (or
/// predate) the nodes it names. The validator reports such connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
  pub id: String,
  pub source_node_id: String,
  pub source_port: String,
  pub target_node_id: String,
  pub target_port: String,
}

impl Connection {
  /// Connect `source`'s `"output"` port to `target`'s `"input"` port.
  pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
    Self::between(id, source, "output", target, "input")
  }

  /// Connect explicit ports, e.g. a condition's `"true_branch"`.
  pub fn between(
    id: impl Into<String>,
    source: impl Into<String>,
    source_port: impl Into<String>,
    target: impl Into<String>,
    target_port: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      source_node_id: source.into(),
      source_port: source_port.into(),
      target_node_id: target.into(),
      target_port: target_port.into(),
    }
  }

  /// Whether either endpoint is `node_id`.
  pub fn touches(&self, node_id: &str) -> bool {
    self.source_node_id == node_id || self.target_node_id == node_id
  }
}
