//! Rule-based severity classification: error rules, then warning rules, then clean.

use regex::{RegexSet, RegexSetBuilder};

use crate::config::Config;
use crate::error::EngineError;
use crate::types::{Classification, LogRecord};

/// Compiled classification rules. Immutable and `Sync`; share one across threads.
#[derive(Debug, Clone)]
pub struct Classifier {
  errors: RegexSet,
  warnings: RegexSet,
}

impl Classifier {
  /// Compile the configured patterns. Fails only on an invalid pattern.
  pub fn new(config: &Config) -> Result<Self, EngineError> {
    Ok(Self {
      errors: build_set("error_patterns", &config.error_patterns, config.case_sensitive)?,
      warnings: build_set(
        "warning_patterns",
        &config.warning_patterns,
        config.case_sensitive,
      )?,
    })
  }

  pub fn with_defaults() -> Result<Self, EngineError> {
    Self::new(&Config::default())
  }

  pub fn classify(&self, record: &LogRecord) -> Classification {
    self.classify_text(&record.text)
  }

  /// First matching rule group wins; unmatched text is clean.
  pub fn classify_text(&self, text: &str) -> Classification {
    if self.errors.is_match(text) {
      Classification::Error
    } else if self.warnings.is_match(text) {
      Classification::Warning
    } else {
      Classification::Clean
    }
  }
}

fn build_set(field: &str, patterns: &[String], case_sensitive: bool) -> Result<RegexSet, EngineError> {
  RegexSetBuilder::new(patterns)
    .case_insensitive(!case_sensitive)
    .build()
    .map_err(|e| EngineError::validation(field, &e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn defaults() -> Classifier {
    Classifier::with_defaults().unwrap()
  }

  #[test]
  fn default_rules_follow_priority() {
    let c = defaults();
    assert_eq!(c.classify_text("Script ERROR in init.lua"), Classification::Error);
    assert_eq!(c.classify_text("[WARN] texture missing"), Classification::Warning);
    assert_eq!(c.classify_text("loaded 42 archives"), Classification::Clean);
  }

  #[test]
  fn error_wins_over_warning() {
    let c = defaults();
    assert_eq!(
      c.classify_text("warning: load failed for mod.archive"),
      Classification::Error
    );
  }

  #[test]
  fn default_keywords_are_word_bounded() {
    let c = defaults();
    assert_eq!(c.classify_text("errorless startup"), Classification::Clean);
    assert_eq!(c.classify_text("forewarned"), Classification::Clean);
    assert_eq!(c.classify_text("attempt to index a nil value"), Classification::Error);
    assert_eq!(c.classify_text("stack traceback:"), Classification::Error);
    assert_eq!(c.classify_text("file doesn't exist"), Classification::Error);
  }

  #[test]
  fn case_sensitivity_is_configurable() {
    let config = Config {
      error_patterns: vec!["FATAL".into()],
      warning_patterns: vec!["Deprecated".into()],
      case_sensitive: true,
      ..Config::default()
    };
    let c = Classifier::new(&config).unwrap();
    assert_eq!(c.classify_text("FATAL: out of memory"), Classification::Error);
    assert_eq!(c.classify_text("fatal: out of memory"), Classification::Clean);
    assert_eq!(c.classify_text("deprecated call"), Classification::Clean);
    assert_eq!(c.classify_text("Deprecated call"), Classification::Warning);
  }

  #[test]
  fn empty_rule_sets_classify_everything_clean() {
    let config = Config {
      error_patterns: Vec::new(),
      warning_patterns: Vec::new(),
      ..Config::default()
    };
    let c = Classifier::new(&config).unwrap();
    assert_eq!(c.classify_text("error warning failed"), Classification::Clean);
  }

  #[test]
  fn invalid_pattern_is_rejected_at_build_time() {
    let config = Config {
      warning_patterns: vec!["(unclosed".into()],
      ..Config::default()
    };
    let err = Classifier::new(&config).unwrap_err();
    assert!(err.to_string().contains("warning_patterns"));
  }

  #[test]
  fn classify_reads_record_text() {
    let record = LogRecord {
      source_id: "game.log".into(),
      line: 7,
      text: "[2024-03-01 10:00:00] Error: missing archive".into(),
      timestamp: None,
    };
    assert_eq!(defaults().classify(&record), Classification::Error);
  }
}
