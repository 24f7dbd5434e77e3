//! One run through the pipeline: Idle -> Ingesting -> Classifying -> Aggregated,
//! or Failed on any ingestion error (partial counts are discarded). A failing
//! source does not stop the others from being read, so the failure names every
//! unreadable source at once.

use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::aggregate::{accumulate, Tally};
use crate::classify::Classifier;
use crate::config::Config;
use crate::error::{EngineError, IngestError};
use crate::ingest::{discover, IngestOptions, LogSource};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Ingesting,
  Classifying,
  Aggregated,
  Failed,
}

impl Phase {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::Ingesting => "ingesting",
      Self::Classifying => "classifying",
      Self::Aggregated => "aggregated",
      Self::Failed => "failed",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Aggregated | Self::Failed)
  }

  /// Forward moves only, one step at a time; any live phase may fail.
  pub fn can_move_to(self, next: Phase) -> bool {
    matches!(
      (self, next),
      (Self::Idle, Self::Ingesting)
        | (Self::Ingesting, Self::Classifying)
        | (Self::Classifying, Self::Aggregated)
        | (Self::Idle | Self::Ingesting | Self::Classifying, Self::Failed)
    )
  }
}

/// Drives a single named run. Borrowed rules and config are read-only, so
/// several pipelines can run at once on different threads.
pub struct RunPipeline<'a> {
  name: String,
  classifier: &'a Classifier,
  config: &'a Config,
  phase: Phase,
}

impl<'a> RunPipeline<'a> {
  pub fn new(name: impl Into<String>, classifier: &'a Classifier, config: &'a Config) -> Self {
    Self {
      name: name.into(),
      classifier,
      config,
      phase: Phase::Idle,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Move to `next`, rejecting skipped or backward transitions.
  pub fn enter(&mut self, next: Phase) -> Result<(), EngineError> {
    if !self.phase.can_move_to(next) {
      return Err(EngineError::InvalidState {
        from: self.phase.as_str(),
        to: next.as_str(),
      });
    }
    debug!(run = %self.name, from = self.phase.as_str(), to = next.as_str(), "phase");
    self.phase = next;
    Ok(())
  }

  /// Run the pipeline to a terminal phase.
  pub fn execute(mut self, specs: &[SourceSpec]) -> Result<RunOutcome, RunFailure> {
    let span = info_span!("run", run = %self.name);
    let _guard = span.enter();
    let started = Instant::now();

    match self.drive(specs, started) {
      Ok(outcome) => {
        info!(
          total = outcome.stats.total_processed(),
          errors = outcome.stats.errors_found(),
          warnings = outcome.stats.warnings_found(),
          clean = outcome.stats.clean_logs(),
          elapsed_ms = outcome.elapsed_ms,
          "run aggregated"
        );
        Ok(outcome)
      }
      Err(err) => {
        if !self.phase.is_terminal() {
          self.phase = Phase::Failed;
        }
        let sources: Vec<SourceFailure> = match &err {
          EngineError::Ingest(e) => vec![e.into()],
          EngineError::SourcesFailed(errors) => errors.iter().map(SourceFailure::from).collect(),
          _ => Vec::new(),
        };
        for source in &sources {
          warn!(source = %source.source_id, error = %source.message, "source failed");
        }
        warn!(failed_sources = sources.len(), error = %err, "run failed");
        Err(RunFailure {
          run: self.name.clone(),
          message: err.to_string(),
          sources,
        })
      }
    }
  }

  fn drive(&mut self, specs: &[SourceSpec], started: Instant) -> Result<RunOutcome, EngineError> {
    self.enter(Phase::Ingesting)?;
    let (sources, mut failures) = resolve_sources(specs, self.config);
    debug!(sources = sources.len(), unresolved = failures.len(), "sources resolved");

    self.enter(Phase::Classifying)?;
    let opts = IngestOptions::from(self.config);
    let mut run_tally = Tally::default();
    let mut summaries = Vec::with_capacity(sources.len());
    let mut findings = Vec::new();
    let mut truncated = false;

    for source in &sources {
      let stats = match self.classify_source(source, &opts, &mut findings, &mut truncated) {
        Ok(stats) => stats,
        Err(e) => {
          failures.push(e);
          continue;
        }
      };
      run_tally.merge(&Tally {
        errors: stats.errors_found(),
        warnings: stats.warnings_found(),
        clean: stats.clean_logs(),
      });
      summaries.push(SourceSummary {
        source_id: source.id().to_string(),
        records: stats.total_processed(),
        errors: stats.errors_found(),
        warnings: stats.warnings_found(),
        clean: stats.errors_found() == 0 && stats.warnings_found() == 0,
      });
    }

    if !failures.is_empty() {
      return Err(EngineError::SourcesFailed(failures));
    }

    self.enter(Phase::Aggregated)?;
    Ok(RunOutcome {
      stats: run_tally.into_stats(self.name.as_str()),
      sources: summaries,
      findings,
      findings_truncated: truncated,
      elapsed_ms: started.elapsed().as_millis() as u64,
    })
  }

  /// Stream one source through the classifier. The source is closed before returning.
  fn classify_source(
    &self,
    source: &LogSource,
    opts: &IngestOptions,
    findings: &mut Vec<Finding>,
    truncated: &mut bool,
  ) -> Result<RunStats, IngestError> {
    let records = source.records(opts)?;
    let mut failure: Option<IngestError> = None;
    let max_findings = self.config.max_findings;
    let max_chars = self.config.max_excerpt_chars;

    let classes = records
      .map_while(|r| match r {
        Ok(record) => Some(record),
        Err(e) => {
          failure = Some(e);
          None
        }
      })
      .map(|record| {
        let class = self.classifier.classify(&record);
        if class != Classification::Clean {
          if findings.len() < max_findings {
            findings.push(Finding {
              classification: class,
              source_id: record.source_id.clone(),
              line: record.line,
              timestamp: record.timestamp,
              excerpt: excerpt(&record.text, max_chars),
            });
          } else {
            *truncated = true;
          }
        }
        class
      });
    let stats = accumulate(source.id(), classes);

    if let Some(e) = failure {
      return Err(e);
    }
    debug!(source = %source.id(), records = stats.total_processed(), "source classified");
    Ok(stats)
  }
}

/// Expand request specs into concrete sources, discovering directories.
/// Directories that cannot be walked are returned alongside the sources that
/// could be resolved.
pub fn resolve_sources(specs: &[SourceSpec], config: &Config) -> (Vec<LogSource>, Vec<IngestError>) {
  let mut sources = Vec::new();
  let mut failures = Vec::new();
  for spec in specs {
    match spec {
      SourceSpec::File { path } => sources.push(LogSource::file(path)),
      SourceSpec::Dir { path } => match discover(path, &config.log_extensions) {
        Ok(found) => sources.extend(found),
        Err(e) => failures.push(e),
      },
      SourceSpec::Text { id, text } => sources.push(LogSource::text(id.clone(), text.as_str())),
    }
  }
  (sources, failures)
}

/// First `max` characters of the record, marked when cut.
fn excerpt(text: &str, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((idx, _)) => format!("{}…", &text[..idx]),
    None => text.to_string(),
  }
}
