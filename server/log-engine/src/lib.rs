//! Log Analysis Engine — deterministic, rule-based.
//!
//! Ingests raw log sources into records, classifies each record as error,
//! warning or clean, aggregates per-run counts and compares consecutive runs
//! (e.g. "Initial" -> "Post-Update" -> "Final").
//!
//! No DB, no network; pure computation over the given sources.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod run;
pub mod types;

pub use aggregate::{accumulate, compare, Tally};
pub use classify::Classifier;
pub use config::{Config, RecordMode};
pub use engine::Engine;
pub use error::{EngineError, IngestError};
pub use ingest::{discover, BlockRules, IngestOptions, LogSource};
pub use types::{
  BatchReport, BatchRequest, Classification, ComparisonReport, LogRecord, RunDelta, RunRequest,
  RunFailure, RunStats, SourceFailure, SourceSpec, SummaryReport,
};
