//! Action executor that describes browser actions instead of performing them.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use flowpilot_runtime::{ActionError, ActionExecutor, ActionOutcome};
use flowpilot_workflow::{Node, NodeKind};
use serde_json::Value;
use tracing::info;

/// Longest sleep a `Wait` node may request during a dry run.
const MAX_WAIT: Duration = Duration::from_secs(30);

/// Logs the action each node would perform.
///
/// `Wait` nodes sleep for `properties.duration_ms` (capped at 30s) so pause and
/// stop can be tried out interactively. Nodes whose kind is listed in
/// `fail_on` report a failure.
pub struct DryRunExecutor {
  fail_on: HashSet<NodeKind>,
}

impl DryRunExecutor {
  pub fn new(fail_on: impl IntoIterator<Item = NodeKind>) -> Self {
    Self {
      fail_on: fail_on.into_iter().collect(),
    }
  }
}

fn string_property<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
  node.properties.get(key).and_then(Value::as_str)
}

fn require_selector(node: &Node) -> Result<&str, ActionError> {
  string_property(node, "selector").ok_or_else(|| {
    ActionError::failed(format!(
      "{} node '{}' has no selector property",
      node.kind, node.id
    ))
  })
}

#[async_trait]
impl ActionExecutor for DryRunExecutor {
  async fn execute(&self, node: &Node) -> Result<ActionOutcome, ActionError> {
    let started = Instant::now();

    let description = match &node.kind {
      NodeKind::Start => "begin workflow".to_string(),
      NodeKind::End => "finish workflow".to_string(),
      NodeKind::Click => format!("click {}", require_selector(node)?),
      NodeKind::Type => {
        let selector = require_selector(node)?;
        let text = string_property(node, "text").unwrap_or_default();
        format!("type {:?} into {}", text, selector)
      }
      NodeKind::Wait => {
        let requested = node
          .properties
          .get("duration_ms")
          .and_then(Value::as_u64)
          .unwrap_or(0);
        let wait = Duration::from_millis(requested).min(MAX_WAIT);
        tokio::time::sleep(wait).await;
        format!("wait {}ms", wait.as_millis())
      }
      NodeKind::Condition => format!(
        "evaluate {}",
        string_property(node, "expression").unwrap_or("condition")
      ),
      NodeKind::Loop => format!(
        "loop {} time(s)",
        node
          .properties
          .get("iterations")
          .and_then(Value::as_u64)
          .unwrap_or(1)
      ),
      NodeKind::Custom(tag) => format!("perform custom action {}", tag),
    };

    info!(node_id = %node.id, action = %description, "dry_run_action");

    let duration_ms = started.elapsed().as_millis() as u64;
    if self.fail_on.contains(&node.kind) {
      return Ok(ActionOutcome::failure(
        format!("{} (forced failure)", description),
        duration_ms,
      ));
    }
    Ok(ActionOutcome::success(description, duration_ms))
  }
}
