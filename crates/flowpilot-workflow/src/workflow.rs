use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::node::{Node, NodeKind};

/// A workflow graph.
///
/// Nodes keep their insertion order, which is the tie-break order for every
/// graph algorithm. Connections keep their addition order, which is the order
/// `outgoing` reports them in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workflow {
  pub id: String,
  pub name: String,
  /// Free-form data (description, version, ...). Not interpreted here.
  pub metadata: Map<String, Value>,
  nodes: HashMap<String, Node>,
  node_order: Vec<String>,
  connections: HashMap<String, Connection>,
  connection_order: Vec<String>,
}

impl Workflow {
  /// Create an empty workflow.
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      ..Default::default()
    }
  }

  /// Insert a node, replacing any node with the same id.
  ///
  /// A replaced node keeps its original insertion position.
  pub fn add_node(&mut self, node: Node) {
    if !self.nodes.contains_key(&node.id) {
      self.node_order.push(node.id.clone());
    }
    self.nodes.insert(node.id.clone(), node);
  }

  /// Remove a node together with every connection that touches it.
  ///
  /// Returns `None` and leaves the workflow unchanged if `node_id` is absent.
  pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
    let node = self.nodes.remove(node_id)?;
    self.node_order.retain(|id| id != node_id);

    let connections = &mut self.connections;
    self.connection_order.retain(|id| {
      let touching = connections.get(id).is_some_and(|c| c.touches(node_id));
      if touching {
        connections.remove(id);
      }
      !touching
    });

    Some(node)
  }

  /// Insert a connection, replacing any connection with the same id.
  pub fn add_connection(&mut self, connection: Connection) {
    if !self.connections.contains_key(&connection.id) {
      self.connection_order.push(connection.id.clone());
    }
    self.connections.insert(connection.id.clone(), connection);
  }

  pub fn remove_connection(&mut self, connection_id: &str) -> Option<Connection> {
    let connection = self.connections.remove(connection_id)?;
    self.connection_order.retain(|id| id != connection_id);
    Some(connection)
  }

  /// Connections leaving `node_id`, in the order they were added, paired with
  /// their target node id.
  pub fn outgoing(&self, node_id: &str) -> Vec<(&Connection, &str)> {
    self
      .connections()
      .filter(|c| c.source_node_id == node_id)
      .map(|c| (c, c.target_node_id.as_str()))
      .collect()
  }

  /// Connections arriving at `node_id`, in the order they were added, paired
  /// with their source node id.
  pub fn incoming(&self, node_id: &str) -> Vec<(&Connection, &str)> {
    self
      .connections()
      .filter(|c| c.target_node_id == node_id)
      .map(|c| (c, c.source_node_id.as_str()))
      .collect()
  }

  /// Target ids of each node's outgoing connections, built in one pass.
  ///
  /// Targets are in the same order as `outgoing`. Every node has an entry;
  /// connections with a missing endpoint are left out. Use this instead of
  /// calling `outgoing` per node when walking the whole graph.
  pub fn successors(&self) -> HashMap<&str, Vec<&str>> {
    let mut successors: HashMap<&str, Vec<&str>> = self
      .nodes()
      .map(|node| (node.id.as_str(), Vec::new()))
      .collect();
    for connection in self.connections() {
      if !self.contains_node(&connection.target_node_id) {
        continue;
      }
      if let Some(targets) = successors.get_mut(connection.source_node_id.as_str()) {
        targets.push(connection.target_node_id.as_str());
      }
    }
    successors
  }

  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.get(node_id)
  }

  pub fn get_connection(&self, connection_id: &str) -> Option<&Connection> {
    self.connections.get(connection_id)
  }

  pub fn contains_node(&self, node_id: &str) -> bool {
    self.nodes.contains_key(node_id)
  }

  /// Nodes in insertion order.
  pub fn nodes(&self) -> impl Iterator<Item = &Node> {
    self.node_order.iter().filter_map(|id| self.nodes.get(id))
  }

  /// Connections in addition order.
  pub fn connections(&self) -> impl Iterator<Item = &Connection> {
    self
      .connection_order
      .iter()
      .filter_map(|id| self.connections.get(id))
  }

  /// Nodes of the given kind, in insertion order.
  pub fn nodes_of_kind<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = &'a Node> {
    self.nodes().filter(move |n| &n.kind == kind)
  }

  /// The first Start node in insertion order.
  pub fn start_node(&self) -> Option<&Node> {
    self.nodes().find(|n| n.is_start())
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn connection_count(&self) -> usize {
    self.connections.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}
