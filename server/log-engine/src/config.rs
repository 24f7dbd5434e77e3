//! Engine configuration with sane defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// How raw lines are grouped into log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordMode {
  /// Every non-blank line is one record.
  #[default]
  Line,
  /// A record starts at each timestamped line; untimestamped lines continue it.
  Timestamped,
  /// Compiler-style diagnostics: a record opens at a start prefix and runs
  /// until an end prefix or a blank line. See the `block_*` settings.
  Block,
}

/// Classification rules and ingestion tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Regexes checked first; any match classifies the record as an error.
  pub error_patterns: Vec<String>,
  /// Regexes checked when no error pattern matched.
  pub warning_patterns: Vec<String>,
  pub case_sensitive: bool,
  pub record_mode: RecordMode,
  /// Per-source read deadline. `None` waits indefinitely.
  pub ingest_timeout_ms: Option<u64>,
  /// Max error/warning findings kept per run for the breakdown.
  pub max_findings: usize,
  /// Findings are cut to this many characters.
  pub max_excerpt_chars: usize,
  /// File extensions picked up when a directory is discovered.
  pub log_extensions: Vec<String>,
  /// Block mode: lines starting with one of these open a new record.
  pub block_start_prefixes: Vec<String>,
  /// Block mode: lines starting with one of these are dropped.
  pub block_skip_prefixes: Vec<String>,
  /// Block mode: a line starting with one of these ends the open record.
  pub block_end_prefixes: Vec<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      error_patterns: [
        r"\berrors?\b",
        r"\bfailed\b",
        r"\bskipped\b",
        r"\bnil value\b",
        r"\bnull value\b",
        r"\bstack trace(back)?\b",
        r"\bnon-existent\b",
        r"\bdoesn't exist\b",
        r"\bdoes not exist\b",
        r"\battempt(ed)? to index\b",
        r"\bcannot be determined\b",
      ]
      .iter()
      .map(|p| p.to_string())
      .collect(),
      warning_patterns: vec![r"\bwarn(ing)?\b".to_string()],
      case_sensitive: false,
      record_mode: RecordMode::Line,
      ingest_timeout_ms: None,
      max_findings: 200,
      max_excerpt_chars: 240,
      log_extensions: vec!["log".to_string()],
      block_start_prefixes: vec!["[WARN".to_string(), "[ERROR".to_string()],
      block_skip_prefixes: vec!["[INFO".to_string()],
      block_end_prefixes: vec!["^^^".to_string()],
    }
  }
}

impl Config {
  /// Load a JSON config file. Missing keys fall back to defaults.
  pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
    let raw = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
  }

  /// Range checks. Pattern syntax is checked when the classifier is built.
  pub fn validate(&self) -> Result<(), EngineError> {
    if self.ingest_timeout_ms == Some(0) {
      return Err(EngineError::validation(
        "ingest_timeout_ms",
        "must be greater than zero",
      ));
    }
    if self.max_excerpt_chars == 0 {
      return Err(EngineError::validation(
        "max_excerpt_chars",
        "must be greater than zero",
      ));
    }
    if self.log_extensions.iter().any(|e| e.trim().is_empty()) {
      return Err(EngineError::validation(
        "log_extensions",
        "must not contain empty entries",
      ));
    }
    if self.record_mode == RecordMode::Block {
      if self.block_start_prefixes.is_empty() {
        return Err(EngineError::validation(
          "block_start_prefixes",
          "block mode needs at least one start prefix",
        ));
      }
      let prefixes = [
        ("block_start_prefixes", &self.block_start_prefixes),
        ("block_skip_prefixes", &self.block_skip_prefixes),
        ("block_end_prefixes", &self.block_end_prefixes),
      ];
      for (field, list) in prefixes {
        if list.iter().any(|p| p.is_empty()) {
          return Err(EngineError::validation(field, "must not contain empty prefixes"));
        }
      }
    }
    Ok(())
  }
}
