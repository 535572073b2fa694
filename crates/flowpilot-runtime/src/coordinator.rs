//! Execution coordinator.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use flowpilot_workflow::Workflow;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::action::{ActionExecutor, TimeoutExecutor};
use crate::config::CoordinatorConfig;
use crate::error::StartError;
use crate::events::{NoopSink, ProgressSink};
use crate::execution::{ExecutionHandle, Worker};

/// Lifecycle state of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  Idle,
  Running,
  Paused,
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunState::Idle => f.write_str("idle"),
      RunState::Running => f.write_str("running"),
      RunState::Paused => f.write_str("paused"),
    }
  }
}

/// Result of a control operation (`pause`, `resume`, `stop`).
///
/// A control call that does not apply to the current state is a no-op and
/// reports the state it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ControlStatus {
  Ok,
  InvalidState(RunState),
}

impl ControlStatus {
  pub fn is_ok(&self) -> bool {
    matches!(self, ControlStatus::Ok)
  }
}

/// Control handles for the run currently in flight.
///
/// A stopped run stays in the slot, marked `stopping`, until its worker has
/// finished the node it was executing.
pub(crate) struct ActiveRun {
  pub(crate) run_id: String,
  cancel: CancellationToken,
  pause: watch::Sender<bool>,
  stopping: bool,
}

impl ActiveRun {
  fn state(&self) -> RunState {
    if self.stopping {
      RunState::Idle
    } else if *self.pause.borrow() {
      RunState::Paused
    } else {
      RunState::Running
    }
  }
}

/// Slot holding the in-flight run, shared with that run's worker so it can
/// clear itself when the walk ends.
pub(crate) type ActiveSlot = Arc<Mutex<Option<ActiveRun>>>;

pub(crate) fn lock_slot(slot: &Mutex<Option<ActiveRun>>) -> MutexGuard<'_, Option<ActiveRun>> {
  slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives workflows through an [`ActionExecutor`], one run at a time.
///
/// Generic over `S: ProgressSink` to allow different reporting strategies.
/// Use `ExecutionCoordinator::new()` to discard progress, or
/// `ExecutionCoordinator::with_sink()` to observe it.
pub struct ExecutionCoordinator<S: ProgressSink = NoopSink> {
  executor: Arc<dyn ActionExecutor>,
  sink: Arc<S>,
  active: ActiveSlot,
}

impl ExecutionCoordinator<NoopSink> {
  /// Create a coordinator that discards progress events.
  pub fn new(executor: impl ActionExecutor + 'static, config: CoordinatorConfig) -> Self {
    Self::with_sink(executor, config, NoopSink)
  }
}

impl<S: ProgressSink + 'static> ExecutionCoordinator<S> {
  /// Create a coordinator reporting to `sink`.
  pub fn with_sink(
    executor: impl ActionExecutor + 'static,
    config: CoordinatorConfig,
    sink: S,
  ) -> Self {
    let executor: Arc<dyn ActionExecutor> = Arc::new(executor);
    let executor: Arc<dyn ActionExecutor> = match config.node_timeout {
      Some(timeout) => Arc::new(TimeoutExecutor::new(executor, timeout)),
      None => executor,
    };

    Self {
      executor,
      sink: Arc::new(sink),
      active: Arc::new(Mutex::new(None)),
    }
  }

  /// Validate `workflow` and start running a snapshot of it.
  ///
  /// Must be called from within a tokio runtime; the run happens on a spawned
  /// task. The returned handle can be awaited for the run's summary; dropping
  /// it does not stop the run.
  ///
  /// # Errors
  /// `Busy` if a run is already in flight, `Stopping` if a stopped run has not
  /// yet finished its current node, `Invalid` if the workflow has fatal
  /// structural violations. The coordinator state is unchanged in all cases.
  pub fn start(&self, workflow: &Workflow) -> Result<ExecutionHandle, StartError> {
    let mut active = lock_slot(&self.active);
    match active.as_ref() {
      Some(run) if run.stopping => {
        return Err(StartError::Stopping {
          run_id: run.run_id.clone(),
        });
      }
      Some(run) => return Err(StartError::Busy { state: run.state() }),
      None => {}
    }

    let warnings = flowpilot_validator::check(workflow)?;
    for warning in &warnings {
      warn!(workflow_id = %workflow.id, warning = %warning, "workflow_warning");
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    let cancel = CancellationToken::new();
    let (pause_tx, pause_rx) = watch::channel(false);

    let worker = Worker {
      run_id: run_id.clone(),
      workflow: workflow.clone(),
      executor: self.executor.clone(),
      sink: self.sink.clone(),
      cancel: cancel.clone(),
      pause: pause_rx,
      active: self.active.clone(),
    };

    *active = Some(ActiveRun {
      run_id: run_id.clone(),
      cancel: cancel.clone(),
      pause: pause_tx,
      stopping: false,
    });

    info!(run_id = %run_id, workflow_id = %workflow.id, "run_requested");
    let join = tokio::spawn(worker.run());

    Ok(ExecutionHandle::new(run_id, workflow.id.clone(), cancel, join))
  }

  /// Suspend the run before its next node. The node in flight finishes.
  pub fn pause(&self) -> ControlStatus {
    let active = lock_slot(&self.active);
    match active.as_ref() {
      Some(run) if run.state() == RunState::Running => {
        run.pause.send_replace(true);
        info!(run_id = %run.run_id, "pause_requested");
        ControlStatus::Ok
      }
      Some(run) => ControlStatus::InvalidState(run.state()),
      None => ControlStatus::InvalidState(RunState::Idle),
    }
  }

  /// Continue a paused run.
  pub fn resume(&self) -> ControlStatus {
    let active = lock_slot(&self.active);
    match active.as_ref() {
      Some(run) if run.state() == RunState::Paused => {
        run.pause.send_replace(false);
        info!(run_id = %run.run_id, "resume_requested");
        ControlStatus::Ok
      }
      Some(run) => ControlStatus::InvalidState(run.state()),
      None => ControlStatus::InvalidState(RunState::Idle),
    }
  }

  /// Stop the run. No further nodes are started. A node already executing
  /// finishes in the background and its result is still reported, but the
  /// run never reports completion.
  ///
  /// The coordinator reports `Idle` as soon as this returns. `start` is
  /// refused with `StartError::Stopping` until the stopped run's worker exits;
  /// await its [`ExecutionHandle`] to know when that is.
  pub fn stop(&self) -> ControlStatus {
    let mut active = lock_slot(&self.active);
    match active.as_mut() {
      Some(run) if !run.stopping => {
        run.stopping = true;
        run.cancel.cancel();
        info!(run_id = %run.run_id, "stop_requested");
        ControlStatus::Ok
      }
      _ => ControlStatus::InvalidState(RunState::Idle),
    }
  }

  pub fn state(&self) -> RunState {
    lock_slot(&self.active)
      .as_ref()
      .map_or(RunState::Idle, ActiveRun::state)
  }

  /// Id of the run in flight, if any. A stopped run is not in flight.
  pub fn current_run_id(&self) -> Option<String> {
    lock_slot(&self.active)
      .as_ref()
      .filter(|run| !run.stopping)
      .map(|run| run.run_id.clone())
  }

  /// Get a reference to the progress sink.
  pub fn sink(&self) -> &S {
    &self.sink
  }
}

impl<S: ProgressSink> Drop for ExecutionCoordinator<S> {
  // A paused run could never be resumed once its controller is gone.
  fn drop(&mut self) {
    if let Some(run) = lock_slot(&self.active).take() {
      run.cancel.cancel();
    }
  }
}
