//! Flowpilot Runtime
//!
//! This crate drives a validated workflow through its nodes, one at a time.
//!
//! # Architecture
//!
//! ```text
//! ExecutionCoordinator
//! ├── start(workflow) -> ExecutionHandle   validates, spawns one worker task
//! ├── pause() / resume()                   takes effect between nodes
//! ├── stop()                               no further nodes are started
//! └── state()                              Idle | Running | Paused
//!
//! worker (one per run)
//! └── depth-first walk from the Start node
//!     ├── ProgressSink::on_progress(current, total)
//!     ├── ActionExecutor::execute(node)
//!     ├── ProgressSink::on_node_result(result)
//!     └── ProgressSink::on_complete(summary)
//! ```
//!
//! The browser side is supplied by the caller as an [`ActionExecutor`]; the
//! presentation side as a [`ProgressSink`]. A failing node is recorded and the
//! walk continues.
//!
//! # Usage
//!
//! ```ignore
//! use flowpilot_runtime::{ChannelSink, CoordinatorConfig, ExecutionCoordinator, ProgressEvent};
//!
//! let (sink, mut events) = ChannelSink::channel();
//! let coordinator = ExecutionCoordinator::with_sink(executor, CoordinatorConfig::default(), sink);
//!
//! let handle = coordinator.start(&workflow)?;
//! while let Some(event) = events.recv().await {
//!   if let ProgressEvent::Complete(_) = event {
//!     break;
//!   }
//!   // render progress
//! }
//! let summary = handle.wait().await?;
//! ```

mod action;
mod config;
mod coordinator;
mod error;
mod events;
mod execution;
mod result;

pub use action::{ActionExecutor, ActionOutcome, TimeoutExecutor};
pub use config::CoordinatorConfig;
pub use coordinator::{ControlStatus, ExecutionCoordinator, RunState};
pub use error::{ActionError, RuntimeError, StartError};
pub use events::{ChannelSink, NoopSink, ProgressEvent, ProgressSink};
pub use execution::{ExecutionHandle, traversal_order};
pub use result::{NodeResult, RunSummary};
