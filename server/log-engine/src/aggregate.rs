//! Per-run counting and cross-run comparison.
//!
//! Nothing here holds shared state: a [`Tally`] is an ordinary value owned by
//! whoever is counting, and both entry points are pure functions.

use crate::error::EngineError;
use crate::types::{Classification, ComparisonReport, RunDelta, RunStats};

/// Running counts for one run (or one source within a run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
  pub errors: u64,
  pub warnings: u64,
  pub clean: u64,
}

impl Tally {
  pub fn record(&mut self, class: Classification) {
    match class {
      Classification::Error => self.errors += 1,
      Classification::Warning => self.warnings += 1,
      Classification::Clean => self.clean += 1,
    }
  }

  pub fn total(&self) -> u64 {
    self.errors + self.warnings + self.clean
  }

  pub fn merge(&mut self, other: &Tally) {
    self.errors += other.errors;
    self.warnings += other.warnings;
    self.clean += other.clean;
  }

  pub fn into_stats(self, run_name: impl Into<String>) -> RunStats {
    RunStats::from_counts(run_name, self.errors, self.warnings, self.clean)
  }
}

/// Count a classified sequence in one pass.
pub fn accumulate<I>(run_name: &str, classes: I) -> RunStats
where
  I: IntoIterator<Item = Classification>,
{
  let mut tally = Tally::default();
  for class in classes {
    tally.record(class);
  }
  tally.into_stats(run_name)
}

/// Compare runs in the given (chronological) order.
///
/// Deltas are computed between consecutive runs only. A single run yields a
/// report without deltas; no runs is an error.
pub fn compare(runs: &[RunStats]) -> Result<ComparisonReport, EngineError> {
  if runs.is_empty() {
    return Err(EngineError::EmptyComparison);
  }

  let deltas = runs.windows(2).map(|w| delta(&w[0], &w[1])).collect();
  Ok(ComparisonReport::new(runs.to_vec(), deltas))
}

fn delta(prior: &RunStats, current: &RunStats) -> RunDelta {
  // Counts span the full u64 range; widen, then saturate into the i64 delta.
  let diff = |a: u64, b: u64| {
    (i128::from(a) - i128::from(b)).clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
  };
  RunDelta {
    from: prior.name().to_string(),
    to: current.name().to_string(),
    errors_resolved: diff(prior.errors_found(), current.errors_found()),
    warnings_resolved: diff(prior.warnings_found(), current.warnings_found()),
    clean_delta: diff(current.clean_logs(), prior.clean_logs()),
    total_delta: diff(current.total_processed(), prior.total_processed()),
  }
}
