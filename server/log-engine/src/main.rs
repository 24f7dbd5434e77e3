//! Binary entrypoint: read one JSON batch request from stdin, write one JSON report to stdout.
//!
//! The request carries an optional config and the runs to analyze, in
//! chronological order. Output is a BatchReport, or an ErrorOutput when the
//! request itself is unusable (bad JSON, invalid config). Logs go to stderr.

use log_engine::types::ErrorOutput;
use log_engine::{BatchRequest, Engine, EngineError};
use std::io::{self, Read, Write};

fn main() {
  log_engine::logging::init_logging();

  if let Err(e) = run_binary() {
    let _ = writeln!(io::stderr(), "log-engine error: {}", e);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), Box<dyn std::error::Error>> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  let request: BatchRequest = match serde_json::from_str(&raw) {
    Ok(r) => r,
    Err(e) => {
      let err = ErrorOutput::new(format!("json parse: {}", e));
      serde_json::to_writer(&mut out, &err)?;
      writeln!(out)?;
      out.flush()?;
      std::process::exit(2);
    }
  };

  let engine = match Engine::new(request.config.unwrap_or_default()) {
    Ok(engine) => engine,
    Err(e) => {
      let err = match &e {
        EngineError::Validation { field, reason } => {
          ErrorOutput::new(reason.clone()).with_field(field.clone())
        }
        _ => ErrorOutput::new(e.to_string()),
      };
      serde_json::to_writer(&mut out, &err)?;
      writeln!(out)?;
      out.flush()?;
      std::process::exit(2);
    }
  };

  let report = engine.run_batch(&request.runs);
  serde_json::to_writer(&mut out, &report)?;
  writeln!(out)?;
  out.flush()?;
  Ok(())
}
