//! Progress events and sinks.
//!
//! The coordinator reports each step of a run to a [`ProgressSink`]. Calls come
//! from the run's single worker task, one at a time, in traversal order.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::result::{NodeResult, RunSummary};

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressEvent {
  /// Node `current` of `total` is about to execute.
  Progress { current: usize, total: usize },

  /// A node finished, successfully or not.
  NodeResult(NodeResult),

  /// Every reachable node has executed.
  Complete(RunSummary),
}

/// Receives progress from a run.
///
/// Implementations must not block for long: the worker waits for each call
/// before moving on.
pub trait ProgressSink: Send + Sync {
  fn on_progress(&self, current: usize, total: usize);

  fn on_node_result(&self, result: &NodeResult);

  fn on_complete(&self, summary: &RunSummary);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
  fn on_progress(&self, _current: usize, _total: usize) {}

  fn on_node_result(&self, _result: &NodeResult) {}

  fn on_complete(&self, _summary: &RunSummary) {}
}

/// A sink that forwards events to an unbounded channel.
///
/// Use this to hand progress to another task, e.g. a UI loop.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  // NOTE: Unbounded so a slow consumer never stalls the run. Volume is two
  // events per node plus one per run.
  sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
  pub fn new(sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
    Self { sender }
  }

  /// Create a sink together with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }

  fn send(&self, event: ProgressEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

impl ProgressSink for ChannelSink {
  fn on_progress(&self, current: usize, total: usize) {
    self.send(ProgressEvent::Progress { current, total });
  }

  fn on_node_result(&self, result: &NodeResult) {
    self.send(ProgressEvent::NodeResult(result.clone()));
  }

  fn on_complete(&self, summary: &RunSummary) {
    self.send(ProgressEvent::Complete(summary.clone()));
  }
}
