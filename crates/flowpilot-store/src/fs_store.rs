use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flowpilot_workflow::Workflow;
use tokio::fs;
use tracing::{info, warn};

use crate::{StoreError, StoredWorkflow, WorkflowStore};

/// Filesystem-based workflow store.
///
/// Workflows are stored one JSON document per file, named by the
/// percent-encoded workflow id:
/// ```text
/// {root}/
/// ├── login.json
/// └── my-team%2Fcheckout.json     (id "my-team/checkout")
/// ```
pub struct FsWorkflowStore {
  root: PathBuf,
}

impl FsWorkflowStore {
  /// Create a new filesystem store at the given root path.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory of the store.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Path of the document for `workflow_id`.
  ///
  /// Everything but ASCII alphanumerics and `-_.~` is percent-encoded, so
  /// distinct ids never share a file.
  fn document_path(&self, workflow_id: &str) -> PathBuf {
    let file_name = format!("{}.json", urlencoding::encode(workflow_id));
    self.root.join(file_name)
  }
}

#[async_trait]
impl WorkflowStore for FsWorkflowStore {
  async fn save(&self, workflow: &Workflow) -> Result<(), StoreError> {
    let warnings = flowpilot_validator::check(workflow)?;
    for warning in &warnings {
      warn!(workflow_id = %workflow.id, warning = %warning, "workflow_warning");
    }

    fs::create_dir_all(&self.root).await?;
    let path = self.document_path(&workflow.id);
    fs::write(&path, workflow.to_json_string()?).await?;

    info!(workflow_id = %workflow.id, path = %path.display(), "workflow_saved");
    Ok(())
  }

  async fn load(&self, workflow_id: &str) -> Result<Workflow, StoreError> {
    let path = self.document_path(workflow_id);
    let content = match fs::read_to_string(&path).await {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Err(StoreError::NotFound(workflow_id.to_string()));
      }
      Err(e) => return Err(e.into()),
    };
    let workflow = Workflow::from_json_str(&content)?;
    if workflow.id != workflow_id {
      warn!(
        workflow_id = %workflow_id,
        stored_id = %workflow.id,
        path = %path.display(),
        "workflow_id_mismatch"
      );
      return Err(StoreError::NotFound(workflow_id.to_string()));
    }
    Ok(workflow)
  }

  async fn list(&self) -> Result<Vec<StoredWorkflow>, StoreError> {
    let mut workflows = Vec::new();

    if !self.root.exists() {
      return Ok(workflows);
    }

    let mut entries = fs::read_dir(&self.root).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }

      let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) => {
          warn!(path = %path.display(), error = %e, "skipping unreadable workflow document");
          continue;
        }
      };
      match Workflow::from_json_str(&content) {
        Ok(workflow) => workflows.push(StoredWorkflow::from(&workflow)),
        Err(e) => {
          warn!(path = %path.display(), error = %e, "skipping unreadable workflow document");
        }
      }
    }

    workflows.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(workflows)
  }

  async fn delete(&self, workflow_id: &str) -> Result<(), StoreError> {
    match fs::remove_file(self.document_path(workflow_id)).await {
      Ok(()) => {
        info!(workflow_id = %workflow_id, "workflow_deleted");
        Ok(())
      }
      Err(e) if e.kind() == ErrorKind::NotFound => {
        Err(StoreError::NotFound(workflow_id.to_string()))
      }
      Err(e) => Err(e.into()),
    }
  }
}
