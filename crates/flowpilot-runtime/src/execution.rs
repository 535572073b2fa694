//! Workflow execution.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use flowpilot_workflow::{Node, Workflow};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::action::ActionExecutor;
use crate::coordinator::{ActiveSlot, lock_slot};
use crate::error::RuntimeError;
use crate::events::ProgressSink;
use crate::result::{NodeResult, RunSummary};

/// Order in which a run visits nodes.
///
/// Depth-first preorder from the first Start node, following `outgoing`
/// connections in the order they were added. Each node appears once;
/// connections to missing nodes are skipped. Empty if there is no Start node.
pub fn traversal_order(workflow: &Workflow) -> Vec<String> {
  let Some(start) = workflow.start_node() else {
    return Vec::new();
  };

  let successors = workflow.successors();
  let mut visited: HashSet<&str> = HashSet::new();
  let mut stack: Vec<&str> = vec![start.id.as_str()];
  let mut order = Vec::new();

  while let Some(node_id) = stack.pop() {
    if !visited.insert(node_id) {
      continue;
    }
    order.push(node_id.to_string());

    // Reversed so the first connection is popped first.
    for &target in successors.get(node_id).into_iter().flatten().rev() {
      if !visited.contains(target) {
        stack.push(target);
      }
    }
  }

  order
}

/// A handle to a run started by the coordinator.
///
/// Call `.wait()` to get the run's summary once the worker exits.
#[derive(Debug)]
pub struct ExecutionHandle {
  run_id: String,
  workflow_id: String,
  cancel: CancellationToken,
  join: JoinHandle<RunSummary>,
}

impl ExecutionHandle {
  pub(crate) fn new(
    run_id: String,
    workflow_id: String,
    cancel: CancellationToken,
    join: JoinHandle<RunSummary>,
  ) -> Self {
    Self {
      run_id,
      workflow_id,
      cancel,
      join,
    }
  }

  pub fn run_id(&self) -> &str {
    &self.run_id
  }

  pub fn workflow_id(&self) -> &str {
    &self.workflow_id
  }

  /// Token that stops this run when cancelled.
  pub fn cancel_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  pub fn is_finished(&self) -> bool {
    self.join.is_finished()
  }

  /// Wait for the worker to exit.
  ///
  /// A stopped run still yields a summary, with `cancelled` set.
  pub async fn wait(self) -> Result<RunSummary, RuntimeError> {
    Ok(self.join.await?)
  }
}

/// The task that walks one workflow snapshot.
pub(crate) struct Worker<S: ProgressSink> {
  pub(crate) run_id: String,
  pub(crate) workflow: Workflow,
  pub(crate) executor: Arc<dyn ActionExecutor>,
  pub(crate) sink: Arc<S>,
  pub(crate) cancel: CancellationToken,
  pub(crate) pause: watch::Receiver<bool>,
  pub(crate) active: ActiveSlot,
}

impl<S: ProgressSink + 'static> Worker<S> {
  #[instrument(
    name = "workflow_run",
    skip(self),
    fields(
      run_id = %self.run_id,
      workflow_id = %self.workflow.id,
    )
  )]
  pub(crate) async fn run(mut self) -> RunSummary {
    let started = Instant::now();
    let order = traversal_order(&self.workflow);
    let total = order.len();

    info!(run_id = %self.run_id, total, "run_started");

    let mut succeeded = 0;
    let mut failed = 0;
    let mut cancelled = false;

    for (index, node_id) in order.iter().enumerate() {
      if !self.wait_until_runnable().await {
        cancelled = true;
        break;
      }

      let Some(node) = self.workflow.get_node(node_id).cloned() else {
        continue;
      };

      self.sink.on_progress(index + 1, total);
      let result = self.execute_node(node).await;

      if result.success {
        succeeded += 1;
      } else {
        failed += 1;
      }
      self.sink.on_node_result(&result);
    }

    // A stop that lands during the last node still counts.
    let cancelled = cancelled || self.cancel.is_cancelled();

    let summary = RunSummary {
      run_id: self.run_id.clone(),
      workflow_id: self.workflow.id.clone(),
      total,
      succeeded,
      failed,
      elapsed_ms: started.elapsed().as_millis() as u64,
      cancelled,
    };

    if cancelled {
      warn!(
        run_id = %self.run_id,
        executed = summary.executed(),
        total,
        "run_stopped"
      );
    } else {
      info!(
        run_id = %self.run_id,
        succeeded,
        failed,
        elapsed_ms = summary.elapsed_ms,
        "run_completed"
      );
      self.sink.on_complete(&summary);
    }

    self.release();
    summary
  }

  /// Block while the run is paused. Returns `false` once the run is stopped.
  async fn wait_until_runnable(&mut self) -> bool {
    if self.cancel.is_cancelled() {
      return false;
    }

    let paused = *self.pause.borrow();
    if !paused {
      return true;
    }

    info!(run_id = %self.run_id, "run_paused");
    let cancel = &self.cancel;
    let pause = &mut self.pause;
    let resumed = tokio::select! {
        _ = cancel.cancelled() => false,
        // An error means the controller is gone and nothing can resume us.
        changed = pause.wait_for(|paused| !*paused) => changed.is_ok(),
    };

    if resumed && !self.cancel.is_cancelled() {
      info!(run_id = %self.run_id, "run_resumed");
      true
    } else {
      false
    }
  }

  /// Run one node's action on its own task so a panic is contained.
  async fn execute_node(&self, node: Node) -> NodeResult {
    info!(
      run_id = %self.run_id,
      node_id = %node.id,
      node_type = %node.kind,
      "node_started"
    );

    let started = Instant::now();
    let executor = self.executor.clone();
    let task_node = node.clone();
    let joined = tokio::spawn(async move { executor.execute(&task_node).await }).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let result = match joined {
      Ok(Ok(outcome)) => NodeResult::from_outcome(&node, outcome),
      Ok(Err(e)) => NodeResult::failed(&node, e.to_string(), elapsed_ms),
      Err(e) => NodeResult::failed(&node, format!("action panicked: {}", e), elapsed_ms),
    };

    if result.success {
      info!(
        run_id = %self.run_id,
        node_id = %node.id,
        duration_ms = result.duration_ms,
        "node_completed"
      );
    } else {
      error!(
        run_id = %self.run_id,
        node_id = %node.id,
        error = %result.message,
        "node_failed"
      );
    }

    result
  }

  /// Return the coordinator to idle. Clears the slot only if it still holds
  /// this run.
  fn release(&self) {
    let mut active = lock_slot(&self.active);
    if active.as_ref().is_some_and(|run| run.run_id == self.run_id) {
      *active = None;
    }
  }
}
