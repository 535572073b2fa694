//! Flowpilot Store
//!
//! This crate provides the storage trait for workflows and a filesystem
//! implementation. Every save is gated by the structural validator, so a
//! store only ever holds workflows that can be run.

mod fs_store;

pub use fs_store::FsWorkflowStore;

use async_trait::async_trait;
use flowpilot_validator::ValidationError;
use flowpilot_workflow::{Workflow, WorkflowError};
use serde::{Deserialize, Serialize};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The requested workflow was not found.
  #[error("workflow not found: {0}")]
  NotFound(String),

  /// The workflow failed validation and was not saved.
  #[error(transparent)]
  Invalid(#[from] ValidationError),

  /// A stored document could not be read back as a workflow.
  #[error("corrupt workflow document: {0}")]
  Workflow(#[from] WorkflowError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Listing entry for a stored workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWorkflow {
  pub id: String,
  pub name: String,
  pub node_count: usize,
}

impl From<&Workflow> for StoredWorkflow {
  fn from(workflow: &Workflow) -> Self {
    Self {
      id: workflow.id.clone(),
      name: workflow.name.clone(),
      node_count: workflow.node_count(),
    }
  }
}

/// Storage trait for workflows.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
  /// Validate and persist a workflow, replacing any stored version.
  async fn save(&self, workflow: &Workflow) -> Result<(), StoreError>;

  /// Load a workflow by id.
  async fn load(&self, workflow_id: &str) -> Result<Workflow, StoreError>;

  /// List stored workflows, ordered by id.
  async fn list(&self) -> Result<Vec<StoredWorkflow>, StoreError>;

  /// Delete a workflow by id.
  async fn delete(&self, workflow_id: &str) -> Result<(), StoreError>;
}
