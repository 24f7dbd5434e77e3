//! Tracing subscriber setup for the log-engine binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the process that owns stderr.

use std::io;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for the binaries.
///
/// Filtering comes from `RUST_LOG` (default "info"). Output goes to stderr so
/// stdout stays reserved for JSON results. `LOG_FORMAT=json` switches to
/// flattened JSON lines.
pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let json = std::env::var("LOG_FORMAT")
    .map(|v| v.eq_ignore_ascii_case("json"))
    .unwrap_or(false);

  let builder = fmt().with_env_filter(filter).with_writer(io::stderr);
  if json {
    builder.json().flatten_event(true).init();
  } else {
    builder.with_target(false).compact().init();
  }
}
