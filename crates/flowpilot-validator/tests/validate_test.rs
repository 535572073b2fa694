//! Integration tests for workflow validation.

use flowpilot_validator::{Severity, Violation, check, is_valid, validate};
use flowpilot_workflow::{Connection, Node, NodeKind, Workflow};
use serde_json::json;

fn build(nodes: &[(&str, &str)], edges: &[(&str, &str)]) -> Workflow {
  let mut workflow = Workflow::new("wf", "Test Workflow");
  for (id, kind) in nodes {
    workflow.add_node(Node::new(*id, *kind));
  }
  for (i, (from, to)) in edges.iter().enumerate() {
    workflow.add_connection(Connection::new(format!("c{}", i + 1), *from, *to));
  }
  workflow
}

fn errors(violations: &[Violation]) -> Vec<&Violation> {
  violations.iter().filter(|v| v.is_error()).collect()
}

#[test]
fn test_valid_chain_has_no_violations() {
  let workflow = build(
    &[("start", "Start"), ("click", "Click"), ("end", "End")],
    &[("start", "click"), ("click", "end")],
  );
  assert!(validate(&workflow).is_empty());
  assert!(is_valid(&workflow));
}

#[test]
fn test_start_only_workflow_is_clean() {
  let workflow = build(&[("start", "Start")], &[]);
  assert!(validate(&workflow).is_empty());
}

#[test]
fn test_missing_end_is_warning() {
  let workflow = build(&[("start", "Start"), ("a", "Click")], &[("start", "a")]);
  let violations = validate(&workflow);

  assert_eq!(violations, vec![Violation::MissingEndNode]);
  assert_eq!(violations[0].severity(), Severity::Warning);
  assert_eq!(check(&workflow).unwrap(), vec![Violation::MissingEndNode]);
}

#[test]
fn test_empty_id_and_name() {
  let mut workflow = build(&[("start", "Start")], &[]);
  workflow.id = String::new();
  workflow.name = String::new();

  assert_eq!(
    validate(&workflow),
    vec![
      Violation::MissingRequiredField { field: "id" },
      Violation::MissingRequiredField { field: "name" },
    ]
  );
}

#[test]
fn test_missing_start_node() {
  let workflow = build(&[("a", "Click"), ("end", "End")], &[("a", "end")]);
  let violations = validate(&workflow);

  assert_eq!(violations[0], Violation::MissingStartNode);
  assert!(!violations.contains(&Violation::Cycle));
  assert_eq!(
    violations[0].to_string(),
    "workflow must have at least one Start node"
  );
}

#[test]
fn test_missing_start_skips_cycle_check() {
  let workflow = build(&[("a", "Click"), ("b", "Click")], &[("a", "b"), ("b", "a")]);
  assert!(!validate(&workflow).contains(&Violation::Cycle));
}

#[test]
fn test_multiple_start_nodes() {
  let workflow = build(
    &[("s1", "Start"), ("s2", "Start"), ("end", "End")],
    &[("s1", "end"), ("s2", "end")],
  );
  assert_eq!(
    validate(&workflow),
    vec![Violation::MultipleStartNodes { count: 2 }]
  );
}

#[test]
fn test_cycle_is_reported_once() {
  // Start -> A -> B -> A
  let workflow = build(
    &[("start", "Start"), ("a", "Click"), ("b", "Click"), ("end", "End")],
    &[("start", "a"), ("a", "b"), ("b", "a"), ("b", "end")],
  );
  let violations = validate(&workflow);

  assert_eq!(violations, vec![Violation::Cycle]);
  assert_eq!(violations[0].to_string(), "workflow contains a cycle");
}

#[test]
fn test_two_cycles_one_message() {
  let workflow = build(
    &[("start", "Start"), ("a", "Click"), ("b", "Click"), ("end", "End")],
    &[("start", "a"), ("a", "a"), ("start", "b"), ("b", "start"), ("b", "end")],
  );
  let cycles = validate(&workflow)
    .into_iter()
    .filter(|v| *v == Violation::Cycle)
    .count();
  assert_eq!(cycles, 1);
}

#[test]
fn test_disconnected_node() {
  // Start -> A, plus an isolated B -> End
  let workflow = build(
    &[("start", "Start"), ("a", "Click"), ("b", "Type"), ("end", "End")],
    &[("start", "a"), ("b", "end")],
  );
  let violations = validate(&workflow);

  assert_eq!(
    violations,
    vec![
      Violation::DisconnectedNode {
        node_id: "b".to_string(),
        kind: "Type".to_string(),
      },
      Violation::DisconnectedNode {
        node_id: "end".to_string(),
        kind: "End".to_string(),
      },
    ]
  );
  assert_eq!(violations[0].to_string(), "disconnected node: Type (b)");
}

#[test]
fn test_dangling_connection() {
  let mut workflow = build(&[("start", "Start"), ("end", "End")], &[("start", "end")]);
  workflow.add_connection(Connection::new("ghost", "start", "missing"));
  workflow.add_connection(Connection::new("phantom", "nowhere", "end"));

  assert_eq!(
    validate(&workflow),
    vec![
      Violation::DanglingConnection {
        connection_id: "ghost".to_string()
      },
      Violation::DanglingConnection {
        connection_id: "phantom".to_string()
      },
    ]
  );
}

#[test]
fn test_removing_node_leaves_no_dangling_connections() {
  let mut workflow = build(
    &[("start", "Start"), ("a", "Click"), ("b", "Click"), ("end", "End")],
    &[("start", "a"), ("a", "b"), ("b", "end"), ("start", "b")],
  );
  workflow.remove_node("a");

  assert!(validate(&workflow).is_empty());
}

#[test]
fn test_violations_follow_check_order() {
  let mut workflow = build(
    &[("s1", "Start"), ("s2", "Start"), ("a", "Click"), ("x", "Wait")],
    &[("s1", "a"), ("a", "s1"), ("s2", "a")],
  );
  workflow.name = String::new();
  workflow.add_connection(Connection::new("bad", "a", "missing"));

  assert_eq!(
    validate(&workflow),
    vec![
      Violation::MissingRequiredField { field: "name" },
      Violation::MultipleStartNodes { count: 2 },
      Violation::MissingEndNode,
      Violation::Cycle,
      Violation::DisconnectedNode {
        node_id: "x".to_string(),
        kind: "Wait".to_string(),
      },
      Violation::DanglingConnection {
        connection_id: "bad".to_string()
      },
    ]
  );
}

#[test]
fn test_check_aggregates_all_violations() {
  let workflow = build(&[("a", "Click"), ("b", "Click")], &[]);
  let err = check(&workflow).unwrap_err();

  assert_eq!(err.violations().len(), 4);
  assert_eq!(err.errors().count(), 3);
  assert_eq!(
    err.to_string(),
    "invalid workflow: workflow must have at least one Start node; \
     workflow has no End node; \
     disconnected node: Click (a); \
     disconnected node: Click (b)"
  );
}

#[test]
fn test_valid_iff_single_start_no_dangling_acyclic() {
  let cases: Vec<(Workflow, bool)> = vec![
    (build(&[("s", "Start"), ("e", "End")], &[("s", "e")]), true),
    (build(&[("s", "Start"), ("e", "End")], &[("s", "e"), ("e", "s")]), false),
    (build(&[("s", "Start"), ("t", "Start")], &[("s", "t")]), false),
    (build(&[("e", "End")], &[]), false),
    (
      {
        let mut w = build(&[("s", "Start"), ("e", "End")], &[("s", "e")]);
        w.add_connection(Connection::new("x", "s", "gone"));
        w
      },
      false,
    ),
  ];

  for (workflow, expected) in cases {
    assert_eq!(errors(&validate(&workflow)).is_empty(), expected);
  }
}

#[test]
fn test_validate_loaded_document() {
  let workflow = Workflow::from_dict(&json!({
    "id": "search",
    "name": "Search",
    "nodes": [
      { "id": "start", "type": "Start" },
      { "id": "query", "type": "Type", "properties": { "selector": "#q", "text": "rust" } },
      { "id": "go", "type": "Click", "properties": { "selector": "#go" } },
      { "id": "end", "type": "End" }
    ],
    "connections": [
      { "id": "c1", "source_node_id": "start", "source_port": "output", "target_node_id": "query", "target_port": "input" },
      { "id": "c2", "source_node_id": "query", "source_port": "output", "target_node_id": "go", "target_port": "input" },
      { "id": "c3", "source_node_id": "go", "source_port": "output", "target_node_id": "end", "target_port": "input" }
    ]
  }))
  .unwrap();

  assert!(validate(&workflow).is_empty());
  assert_eq!(workflow.get_node("query").unwrap().kind, NodeKind::Type);
}
