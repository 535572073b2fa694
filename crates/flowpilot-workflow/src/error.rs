use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  /// A required top-level field is absent from a workflow document.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  /// Two nodes, or two connections, in one document share an id.
  #[error("duplicate {entity} id: {id}")]
  DuplicateId { entity: &'static str, id: String },

  #[error("invalid workflow document: {0}")]
  Json(#[from] serde_json::Error),
}
