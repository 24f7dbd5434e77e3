//! Structured error types for the log engine.

use thiserror::Error;

/// Failure to read one log source. Local to that source: it fails the run the
/// source belongs to, never its siblings in a batch.
#[derive(Debug, Error)]
pub enum IngestError {
  #[error("ingest: {source_id}: unreadable: {cause}")]
  Unreadable {
    source_id: String,
    #[source]
    cause: std::io::Error,
  },

  #[error("ingest: {source_id}: binary content at line {line}")]
  Binary { source_id: String, line: usize },

  #[error("ingest: {source_id}: timed out after {limit_ms}ms")]
  Timeout { source_id: String, limit_ms: u64 },
}

impl IngestError {
  pub fn unreadable(source_id: &str, cause: std::io::Error) -> Self {
    Self::Unreadable {
      source_id: source_id.to_string(),
      cause,
    }
  }

  /// The source this failure is attributed to.
  pub fn source_id(&self) -> &str {
    match self {
      Self::Unreadable { source_id, .. }
      | Self::Binary { source_id, .. }
      | Self::Timeout { source_id, .. } => source_id,
    }
  }
}

#[derive(Debug, Error)]
pub enum EngineError {
  #[error(transparent)]
  Ingest(#[from] IngestError),

  /// Every source of a run was attempted and these could not be read.
  #[error("ingest: {} source(s) failed", .0.len())]
  SourcesFailed(Vec<IngestError>),

  #[error("compare: at least one run is required")]
  EmptyComparison,

  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("run state: cannot move from {from} to {to}")]
  InvalidState { from: &'static str, to: &'static str },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}
