//! Core types for the log engine (JSON contracts + internal models).

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{EngineError, IngestError};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One batch on stdin. Unknown fields are silently ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
  #[serde(default)]
  pub config: Option<Config>,
  pub runs: Vec<RunRequest>,
}

/// A named run over one or more log sources, e.g. "Initial" or "Post-Update".
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
  pub name: String,
  pub sources: Vec<SourceSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
  File { path: PathBuf },
  /// Every matching log file under the directory, recursively.
  Dir { path: PathBuf },
  Text { id: String, text: String },
}

// ---------------------------------------------------------------------------
// Records + classification
// ---------------------------------------------------------------------------

/// One parsed unit of log input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
  pub source_id: String,
  /// 1-based line the record starts on.
  pub line: usize,
  /// Raw text; multi-line records keep their newlines.
  pub text: String,
  pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
  Error,
  Warning,
  Clean,
}

// ---------------------------------------------------------------------------
// Run stats
// ---------------------------------------------------------------------------

/// Aggregate counts for one named run.
///
/// `total_processed == errors_found + warnings_found + clean_logs` always
/// holds: the total is derived at construction and re-checked on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RunStatsRepr")]
pub struct RunStats {
  name: String,
  #[serde(rename = "total_logs_processed")]
  total_processed: u64,
  errors_found: u64,
  warnings_found: u64,
  clean_logs: u64,
}

impl RunStats {
  pub fn from_counts(name: impl Into<String>, errors: u64, warnings: u64, clean: u64) -> Self {
    Self {
      name: name.into(),
      total_processed: errors + warnings + clean,
      errors_found: errors,
      warnings_found: warnings,
      clean_logs: clean,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn total_processed(&self) -> u64 {
    self.total_processed
  }

  pub fn errors_found(&self) -> u64 {
    self.errors_found
  }

  pub fn warnings_found(&self) -> u64 {
    self.warnings_found
  }

  pub fn clean_logs(&self) -> u64 {
    self.clean_logs
  }

  /// The summary-report shape (no run name).
  pub fn summary(&self) -> SummaryReport {
    SummaryReport {
      total_logs_processed: self.total_processed,
      errors_found: self.errors_found,
      warnings_found: self.warnings_found,
      clean_logs: self.clean_logs,
    }
  }
}

#[derive(Deserialize)]
struct RunStatsRepr {
  name: String,
  total_logs_processed: u64,
  errors_found: u64,
  warnings_found: u64,
  clean_logs: u64,
}

impl TryFrom<RunStatsRepr> for RunStats {
  type Error = EngineError;

  fn try_from(r: RunStatsRepr) -> Result<Self, Self::Error> {
    let sum = r
      .errors_found
      .checked_add(r.warnings_found)
      .and_then(|s| s.checked_add(r.clean_logs));
    if sum != Some(r.total_logs_processed) {
      return Err(EngineError::validation(
        "total_logs_processed",
        "must equal errors_found + warnings_found + clean_logs",
      ));
    }
    Ok(RunStats::from_counts(
      r.name,
      r.errors_found,
      r.warnings_found,
      r.clean_logs,
    ))
  }
}

/// Summary-report input for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
  pub total_logs_processed: u64,
  pub errors_found: u64,
  pub warnings_found: u64,
  pub clean_logs: u64,
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Change between two consecutive runs. Positive `*_resolved` means fewer
/// findings in the later run; `clean_delta`/`total_delta` are `to - from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunDelta {
  pub from: String,
  pub to: String,
  pub errors_resolved: i64,
  pub warnings_resolved: i64,
  pub clean_delta: i64,
  pub total_delta: i64,
}

impl RunDelta {
  pub fn is_unchanged(&self) -> bool {
    self.errors_resolved == 0
      && self.warnings_resolved == 0
      && self.clean_delta == 0
      && self.total_delta == 0
  }
}

/// Runs in the order given (chronological) plus consecutive deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
  runs: Vec<RunStats>,
  deltas: Vec<RunDelta>,
}

impl ComparisonReport {
  pub(crate) fn new(runs: Vec<RunStats>, deltas: Vec<RunDelta>) -> Self {
    Self { runs, deltas }
  }

  pub fn runs(&self) -> &[RunStats] {
    &self.runs
  }

  pub fn deltas(&self) -> &[RunDelta] {
    &self.deltas
  }

  pub fn has_changes(&self) -> bool {
    self.deltas.iter().any(|d| !d.is_unchanged())
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// Per-source counts within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
  pub source_id: String,
  pub records: u64,
  pub errors: u64,
  pub warnings: u64,
  /// No error or warning records.
  pub clean: bool,
}

/// An error or warning record kept for the breakdown table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
  pub classification: Classification,
  pub source_id: String,
  pub line: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<NaiveDateTime>,
  pub excerpt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
  pub stats: RunStats,
  pub sources: Vec<SourceSummary>,
  pub findings: Vec<Finding>,
  /// More findings existed than `max_findings` allowed.
  pub findings_truncated: bool,
  pub elapsed_ms: u64,
}

/// One source that could not be read during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
  pub source_id: String,
  pub message: String,
}

impl From<&IngestError> for SourceFailure {
  fn from(e: &IngestError) -> Self {
    Self {
      source_id: e.source_id().to_string(),
      message: e.to_string(),
    }
  }
}

/// A run that ended in the `Failed` state. Its partial stats are discarded.
/// Every source is still attempted, so `sources` lists all the unreadable ones
/// in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunFailure {
  pub run: String,
  pub message: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub sources: Vec<SourceFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
  pub runs: Vec<RunOutcome>,
  pub failures: Vec<RunFailure>,
  /// Comparison of the successful runs; absent when none succeeded.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comparison: Option<ComparisonReport>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for an unusable request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
