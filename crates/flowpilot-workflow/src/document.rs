//! Interchange form of a workflow.
//!
//! ```text
//! {
//!   "id": "...", "name": "...", "metadata": {...},
//!   "nodes": [{"id", "type", "position": [x, y], "properties": {...}, "label"}],
//!   "connections": [{"id", "source_node_id", "source_port", "target_node_id", "target_port"}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::error::WorkflowError;
use crate::node::Node;
use crate::workflow::Workflow;

/// Flattened, serializable form of a [`Workflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub metadata: Map<String, Value>,
  #[serde(default)]
  pub nodes: Vec<Node>,
  #[serde(default)]
  pub connections: Vec<Connection>,
}

impl From<&Workflow> for WorkflowDocument {
  fn from(workflow: &Workflow) -> Self {
    Self {
      id: workflow.id.clone(),
      name: workflow.name.clone(),
      metadata: workflow.metadata.clone(),
      nodes: workflow.nodes().cloned().collect(),
      connections: workflow.connections().cloned().collect(),
    }
  }
}

impl TryFrom<WorkflowDocument> for Workflow {
  type Error = WorkflowError;

  fn try_from(doc: WorkflowDocument) -> Result<Self, Self::Error> {
    let mut workflow = Workflow::new(doc.id, doc.name);
    workflow.metadata = doc.metadata;
    for node in doc.nodes {
      if workflow.contains_node(&node.id) {
        return Err(WorkflowError::DuplicateId {
          entity: "node",
          id: node.id,
        });
      }
      workflow.add_node(node);
    }
    for connection in doc.connections {
      if workflow.get_connection(&connection.id).is_some() {
        return Err(WorkflowError::DuplicateId {
          entity: "connection",
          id: connection.id,
        });
      }
      workflow.add_connection(connection);
    }
    Ok(workflow)
  }
}

impl Workflow {
  /// Flatten into the interchange document.
  pub fn to_document(&self) -> WorkflowDocument {
    WorkflowDocument::from(self)
  }

  /// Build a workflow from its interchange document.
  ///
  /// # Errors
  /// `DuplicateId` if two nodes or two connections share an id.
  pub fn from_document(doc: WorkflowDocument) -> Result<Self, WorkflowError> {
    Workflow::try_from(doc)
  }

  /// Flatten into a plain JSON value.
  pub fn to_dict(&self) -> Result<Value, WorkflowError> {
    Ok(serde_json::to_value(self.to_document())?)
  }

  /// Build a workflow from a plain JSON value.
  ///
  /// # Errors
  /// `MissingField` if `id` or `name` is absent, `DuplicateId` if an id is
  /// repeated, `Json` for any other shape mismatch.
  pub fn from_dict(data: &Value) -> Result<Self, WorkflowError> {
    for field in ["id", "name"] {
      if data.get(field).is_none() {
        return Err(WorkflowError::MissingField(field));
      }
    }
    let doc = WorkflowDocument::deserialize(data)?;
    Self::from_document(doc)
  }

  pub fn from_json_str(json: &str) -> Result<Self, WorkflowError> {
    let value: Value = serde_json::from_str(json)?;
    Self::from_dict(&value)
  }

  pub fn to_json_string(&self) -> Result<String, WorkflowError> {
    Ok(serde_json::to_string_pretty(&self.to_document())?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::node::NodeKind;
  use serde_json::json;

  fn sample() -> Workflow {
    let mut workflow = Workflow::new("login", "Log in");
    workflow
      .metadata
      .insert("description".to_string(), json!("sign into the dashboard"));
    workflow.metadata.insert("version".to_string(), json!(2));
    workflow.add_node(Node::new("start", NodeKind::Start).with_position(0, 0));
    workflow.add_node(
      Node::new("user", NodeKind::Type)
        .with_position(120, 40)
        .with_label("Username")
        .with_property("selector", "#user")
        .with_property("text", "alice")
        .with_property("options", json!({ "clear": true, "delays": [10, 20] })),
    );
    workflow.add_node(Node::new("shot", NodeKind::Custom("Screenshot".to_string())));
    workflow.add_node(Node::new("end", NodeKind::End).with_position(240, 40));
    workflow.add_connection(Connection::new("c1", "start", "user"));
    workflow.add_connection(Connection::new("c2", "user", "shot"));
    workflow.add_connection(Connection::between("c3", "shot", "output", "end", "input"));
    workflow
  }

  #[test]
  fn test_round_trip_through_dict() {
    let workflow = sample();
    let restored = Workflow::from_dict(&workflow.to_dict().unwrap()).unwrap();
    assert_eq!(restored, workflow);
  }

  #[test]
  fn test_round_trip_empty_workflow() {
    let workflow = Workflow::new("empty", "Empty");
    let restored = Workflow::from_dict(&workflow.to_dict().unwrap()).unwrap();
    assert_eq!(restored, workflow);
  }

  #[test]
  fn test_round_trip_through_json_string() {
    let workflow = sample();
    let json = workflow.to_json_string().unwrap();
    assert_eq!(Workflow::from_json_str(&json).unwrap(), workflow);
  }

  #[test]
  fn test_to_dict_shape() {
    let mut workflow = Workflow::new("wf", "Shape");
    workflow.add_node(Node::new("start", NodeKind::Start).with_position(3, 4));
    workflow.add_connection(Connection::new("c1", "start", "start"));

    assert_eq!(
      workflow.to_dict().unwrap(),
      json!({
        "id": "wf",
        "name": "Shape",
        "metadata": {},
        "nodes": [
          { "id": "start", "type": "Start", "position": [3, 4], "properties": {}, "label": "" }
        ],
        "connections": [
          {
            "id": "c1",
            "source_node_id": "start",
            "source_port": "output",
            "target_node_id": "start",
            "target_port": "input"
          }
        ]
      })
    );
  }

  #[test]
  fn test_from_dict_missing_id() {
    let result = Workflow::from_dict(&json!({ "name": "x", "nodes": [] }));
    assert!(matches!(result, Err(WorkflowError::MissingField("id"))));
  }

  #[test]
  fn test_from_dict_missing_name() {
    let result = Workflow::from_dict(&json!({ "id": "x" }));
    assert!(matches!(result, Err(WorkflowError::MissingField("name"))));
  }

  #[test]
  fn test_from_dict_rejects_bad_position() {
    let result = Workflow::from_dict(&json!({
      "id": "x",
      "name": "x",
      "nodes": [{ "id": "a", "type": "Start", "position": [1] }]
    }));
    assert!(matches!(result, Err(WorkflowError::Json(_))));
  }

  #[test]
  fn test_from_dict_defaults_collections() {
    let workflow = Workflow::from_dict(&json!({ "id": "x", "name": "y" })).unwrap();
    assert!(workflow.is_empty());
    assert_eq!(workflow.connection_count(), 0);
    assert!(workflow.metadata.is_empty());
  }

  #[test]
  fn test_from_dict_rejects_duplicate_node_id() {
    let result = Workflow::from_dict(&json!({
      "id": "x",
      "name": "x",
      "nodes": [
        { "id": "start", "type": "Start" },
        { "id": "a", "type": "Click" },
        { "id": "a", "type": "Type" }
      ]
    }));
    match result {
      Err(WorkflowError::DuplicateId { entity, id }) => {
        assert_eq!(entity, "node");
        assert_eq!(id, "a");
      }
      other => panic!("expected duplicate id error, got {:?}", other),
    }
  }

  #[test]
  fn test_from_dict_rejects_duplicate_connection_id() {
    let result = Workflow::from_dict(&json!({
      "id": "x",
      "name": "x",
      "nodes": [{ "id": "start", "type": "Start" }, { "id": "end", "type": "End" }],
      "connections": [
        { "id": "c1", "source_node_id": "start", "source_port": "output",
          "target_node_id": "end", "target_port": "input" },
        { "id": "c1", "source_node_id": "end", "source_port": "output",
          "target_node_id": "start", "target_port": "input" }
      ]
    }));
    assert!(matches!(
      result,
      Err(WorkflowError::DuplicateId { entity: "connection", .. })
    ));
  }
}
