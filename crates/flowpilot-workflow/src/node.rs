use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The action a node performs.
///
/// The set is open: any tag that is not one of the built-in kinds is kept
/// verbatim as `Custom` so user-defined actions survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
  Start,
  End,
  Click,
  Type,
  Wait,
  Condition,
  Loop,
  Custom(String),
}

impl NodeKind {
  /// The wire tag for this kind.
  pub fn as_str(&self) -> &str {
    match self {
      NodeKind::Start => "Start",
      NodeKind::End => "End",
      NodeKind::Click => "Click",
      NodeKind::Type => "Type",
      NodeKind::Wait => "Wait",
      NodeKind::Condition => "Condition",
      NodeKind::Loop => "Loop",
      NodeKind::Custom(tag) => tag,
    }
  }
}

impl From<String> for NodeKind {
  fn from(tag: String) -> Self {
    match tag.as_str() {
      "Start" => NodeKind::Start,
      "End" => NodeKind::End,
      "Click" => NodeKind::Click,
      "Type" => NodeKind::Type,
      "Wait" => NodeKind::Wait,
      "Condition" => NodeKind::Condition,
      "Loop" => NodeKind::Loop,
      _ => NodeKind::Custom(tag),
    }
  }
}

impl From<&str> for NodeKind {
  fn from(tag: &str) -> Self {
    NodeKind::from(tag.to_string())
  }
}

impl From<NodeKind> for String {
  fn from(kind: NodeKind) -> Self {
    match kind {
      NodeKind::Custom(tag) => tag,
      other => other.as_str().to_string(),
    }
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single action in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: NodeKind,
  /// Canvas coordinates. Layout only; never read by validation or execution.
  #[serde(default)]
  pub position: (i64, i64),
  /// Action parameters, interpreted by the action executor for `kind`.
  #[serde(default)]
  pub properties: Map<String, Value>,
  #[serde(default)]
  pub label: String,
}

impl Node {
  /// Create a node at the origin with no properties and an empty label.
  pub fn new(id: impl Into<String>, kind: impl Into<NodeKind>) -> Self {
    Self {
      id: id.into(),
      kind: kind.into(),
      position: (0, 0),
      properties: Map::new(),
      label: String::new(),
    }
  }

  pub fn with_position(mut self, x: i64, y: i64) -> Self {
    self.position = (x, y);
    self
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = label.into();
    self
  }

  pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.properties.insert(key.into(), value.into());
    self
  }

  pub fn is_start(&self) -> bool {
    self.kind == NodeKind::Start
  }

  pub fn is_end(&self) -> bool {
    self.kind == NodeKind::End
  }
}
