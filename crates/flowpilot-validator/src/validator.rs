use std::collections::{HashMap, HashSet, VecDeque};

use flowpilot_workflow::{NodeKind, Workflow};
use tracing::debug;

use crate::error::ValidationError;
use crate::violation::Violation;

/// Run every structural check and return all violations, in check order.
///
/// An empty list means the workflow is valid. The list may contain warnings
/// (see [`Violation::severity`]) that do not make the workflow invalid.
pub fn validate(workflow: &Workflow) -> Vec<Violation> {
  let mut violations = Vec::new();

  check_required_fields(workflow, &mut violations);
  let start_count = check_start_nodes(workflow, &mut violations);
  check_end_node(workflow, &mut violations);

  // Without a Start node there is nothing to root the search at.
  if start_count > 0 && has_cycle(workflow) {
    violations.push(Violation::Cycle);
  }

  check_disconnected(workflow, &mut violations);
  check_dangling_connections(workflow, &mut violations);

  debug!(
    workflow_id = %workflow.id,
    violations = violations.len(),
    "workflow_validated"
  );

  violations
}

/// Whether the workflow has no fatal violations.
pub fn is_valid(workflow: &Workflow) -> bool {
  validate(workflow).iter().all(|v| !v.is_error())
}

/// Gate a workflow before running or saving it.
///
/// # Errors
/// Returns every violation (warnings included) as one [`ValidationError`] if
/// any of them is fatal. Otherwise returns the warnings.
pub fn check(workflow: &Workflow) -> Result<Vec<Violation>, ValidationError> {
  let violations = validate(workflow);
  if violations.iter().any(Violation::is_error) {
    return Err(ValidationError::new(violations));
  }
  Ok(violations)
}

/// Ids of the nodes reachable from the Start node(s), in breadth-first order.
///
/// The Start nodes themselves come first, in insertion order. Connections to
/// ids that are not nodes are not followed.
pub fn reachable_from_start(workflow: &Workflow) -> Vec<String> {
  let successors = workflow.successors();
  let mut seen: HashSet<&str> = HashSet::new();
  let mut queue: VecDeque<&str> = VecDeque::new();
  let mut order = Vec::new();

  for node in workflow.nodes_of_kind(&NodeKind::Start) {
    if seen.insert(node.id.as_str()) {
      queue.push_back(node.id.as_str());
    }
  }

  while let Some(node_id) = queue.pop_front() {
    order.push(node_id.to_string());
    for &target in successors.get(node_id).into_iter().flatten() {
      if seen.insert(target) {
        queue.push_back(target);
      }
    }
  }

  order
}

fn check_required_fields(workflow: &Workflow, violations: &mut Vec<Violation>) {
  if workflow.id.is_empty() {
    violations.push(Violation::MissingRequiredField { field: "id" });
  }
  if workflow.name.is_empty() {
    violations.push(Violation::MissingRequiredField { field: "name" });
  }
}

fn check_start_nodes(workflow: &Workflow, violations: &mut Vec<Violation>) -> usize {
  let count = workflow.nodes_of_kind(&NodeKind::Start).count();
  match count {
    0 => violations.push(Violation::MissingStartNode),
    1 => {}
    count => violations.push(Violation::MultipleStartNodes { count }),
  }
  count
}

fn check_end_node(workflow: &Workflow, violations: &mut Vec<Violation>) {
  // A lone Start node is a freshly created workflow, not an unfinished one.
  if workflow.node_count() > 1 && workflow.nodes_of_kind(&NodeKind::End).next().is_none() {
    violations.push(Violation::MissingEndNode);
  }
}

fn check_disconnected(workflow: &Workflow, violations: &mut Vec<Violation>) {
  let reachable: HashSet<String> = reachable_from_start(workflow).into_iter().collect();
  for node in workflow.nodes() {
    if !reachable.contains(&node.id) {
      violations.push(Violation::DisconnectedNode {
        node_id: node.id.clone(),
        kind: node.kind.to_string(),
      });
    }
  }
}

fn check_dangling_connections(workflow: &Workflow, violations: &mut Vec<Violation>) {
  for connection in workflow.connections() {
    if !workflow.contains_node(&connection.source_node_id)
      || !workflow.contains_node(&connection.target_node_id)
    {
      violations.push(Violation::DanglingConnection {
        connection_id: connection.id.clone(),
      });
    }
  }
}

/// Three-colour DFS, rooted at every unvisited node in insertion order.
///
/// Uses an explicit stack of `(node, next edge index)` frames so deep graphs do
/// not exhaust the call stack.
fn has_cycle(workflow: &Workflow) -> bool {
  const WHITE: u8 = 0;
  const GRAY: u8 = 1;
  const BLACK: u8 = 2;

  let adjacency = workflow.successors();

  let mut color: HashMap<&str, u8> = adjacency.keys().map(|id| (*id, WHITE)).collect();

  for root in workflow.nodes() {
    let root = root.id.as_str();
    if color.get(root) != Some(&WHITE) {
      continue;
    }

    color.insert(root, GRAY);
    let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
      let (node, next) = *frame;
      frame.1 += 1;

      let neighbor = adjacency.get(node).and_then(|targets| targets.get(next));
      match neighbor {
        Some(&neighbor) => match color.get(neighbor).copied() {
          // Back edge to a node on the current path.
          Some(GRAY) => return true,
          Some(WHITE) => {
            color.insert(neighbor, GRAY);
            stack.push((neighbor, 0));
          }
          _ => {}
        },
        None => {
          color.insert(node, BLACK);
          stack.pop();
        }
      }
    }
  }

  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use flowpilot_workflow::{Connection, Node};

  fn workflow_with(nodes: &[(&str, NodeKind)], edges: &[(&str, &str)]) -> Workflow {
    let mut workflow = Workflow::new("wf", "Test");
    for (id, kind) in nodes {
      workflow.add_node(Node::new(*id, kind.clone()));
    }
    for (i, (from, to)) in edges.iter().enumerate() {
      workflow.add_connection(Connection::new(format!("c{}", i + 1), *from, *to));
    }
    workflow
  }

  #[test]
  fn test_has_cycle_self_loop() {
    let workflow = workflow_with(&[("s", NodeKind::Start)], &[("s", "s")]);
    assert!(has_cycle(&workflow));
  }

  #[test]
  fn test_has_cycle_ignores_diamond() {
    let workflow = workflow_with(
      &[
        ("s", NodeKind::Start),
        ("a", NodeKind::Click),
        ("b", NodeKind::Click),
        ("e", NodeKind::End),
      ],
      &[("s", "a"), ("s", "b"), ("a", "e"), ("b", "e")],
    );
    assert!(!has_cycle(&workflow));
  }

  #[test]
  fn test_has_cycle_ignores_dangling_targets() {
    let workflow = workflow_with(&[("s", NodeKind::Start)], &[("s", "ghost")]);
    assert!(!has_cycle(&workflow));
  }

  fn deep_chain(len: usize) -> Workflow {
    let mut workflow = Workflow::new("wf", "Deep");
    workflow.add_node(Node::new("n0", NodeKind::Start));
    for i in 1..len {
      let kind = if i + 1 == len { NodeKind::End } else { NodeKind::Click };
      workflow.add_node(Node::new(format!("n{}", i), kind));
      workflow.add_connection(Connection::new(
        format!("c{}", i),
        format!("n{}", i - 1),
        format!("n{}", i),
      ));
    }
    workflow
  }

  #[test]
  fn test_has_cycle_deep_chain() {
    assert!(!has_cycle(&deep_chain(20_000)));
  }

  #[test]
  fn test_validate_deep_chain_in_linear_time() {
    let workflow = deep_chain(20_000);
    let started = std::time::Instant::now();

    assert!(validate(&workflow).is_empty());
    assert_eq!(reachable_from_start(&workflow).len(), 20_000);
    // A per-node scan of every connection takes tens of seconds here.
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
  }

  #[test]
  fn test_reachable_is_breadth_first() {
    let workflow = workflow_with(
      &[
        ("s", NodeKind::Start),
        ("a", NodeKind::Click),
        ("b", NodeKind::Click),
        ("c", NodeKind::Click),
        ("lonely", NodeKind::Click),
      ],
      &[("s", "a"), ("a", "c"), ("s", "b")],
    );
    assert_eq!(reachable_from_start(&workflow), vec!["s", "a", "b", "c"]);
  }
}
