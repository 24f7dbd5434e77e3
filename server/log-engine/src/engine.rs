//! Core engine: compiled rules + config, runs batches and compares their results.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::aggregate;
use crate::classify::Classifier;
use crate::config::Config;
use crate::error::EngineError;
use crate::run::RunPipeline;
use crate::types::*;

/// The log analysis engine. Holds no per-run state; every method takes `&self`
/// and concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct Engine {
  config: Config,
  classifier: Classifier,
}

impl Engine {
  pub fn new(config: Config) -> Result<Self, EngineError> {
    config.validate()?;
    let classifier = Classifier::new(&config)?;
    Ok(Self { config, classifier })
  }

  pub fn with_defaults() -> Result<Self, EngineError> {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn classifier(&self) -> &Classifier {
    &self.classifier
  }

  /// Process one run to completion.
  pub fn run(&self, request: &RunRequest) -> Result<RunOutcome, RunFailure> {
    RunPipeline::new(request.name.as_str(), &self.classifier, &self.config).execute(&request.sources)
  }

  /// Process runs in parallel. Outcomes and failures keep request order; a
  /// failed run never affects its siblings.
  pub fn run_batch(&self, requests: &[RunRequest]) -> BatchReport {
    info!(runs = requests.len(), "batch started");

    let results: Vec<Result<RunOutcome, RunFailure>> =
      requests.par_iter().map(|request| self.run(request)).collect();

    let mut runs = Vec::new();
    let mut failures = Vec::new();
    for result in results {
      match result {
        Ok(outcome) => runs.push(outcome),
        Err(failure) => failures.push(failure),
      }
    }

    let stats: Vec<RunStats> = runs.iter().map(|o| o.stats.clone()).collect();
    let comparison = match self.compare(&stats) {
      Ok(report) => Some(report),
      Err(e) => {
        warn!(error = %e, "no successful runs to compare");
        None
      }
    };

    info!(
      succeeded = runs.len(),
      failed = failures.len(),
      "batch finished"
    );
    BatchReport {
      runs,
      failures,
      comparison,
    }
  }

  /// Compare already-computed runs in the given order.
  pub fn compare(&self, runs: &[RunStats]) -> Result<ComparisonReport, EngineError> {
    aggregate::compare(runs)
  }
}
