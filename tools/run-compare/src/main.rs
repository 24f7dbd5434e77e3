//! run-compare: compare saved run stats in chronological order
//!
//! Usage:
//!   run-compare <stats1.json> <stats2.json> ...   # print consecutive deltas
//!   run-compare <files...> --json                 # emit the ComparisonReport as JSON
//!   run-compare <files...> -q                     # quiet: exit 0 if unchanged, 1 if changed
//!
//! Each file holds one RunStats object or an array of them, as written by
//! log-engine. Runs are compared in argument order, never sorted.

use std::env;
use std::fs;
use std::process;

use log_engine::{compare, RunDelta, RunStats};
use serde_json::Value;

fn load_stats(path: &str) -> Vec<RunStats> {
    let contents = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("run-compare: cannot read {}: {}", path, e);
        process::exit(2);
    });
    let value: Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("run-compare: invalid JSON in {}: {}", path, e);
        process::exit(2);
    });
    let parsed = match value {
        Value::Array(_) => serde_json::from_value::<Vec<RunStats>>(value),
        other => serde_json::from_value::<RunStats>(other).map(|s| vec![s]),
    };
    parsed.unwrap_or_else(|e| {
        eprintln!("run-compare: invalid run stats in {}: {}", path, e);
        process::exit(2);
    })
}

fn signed(n: i64) -> String {
    if n > 0 {
        format!("+{}", n)
    } else {
        n.to_string()
    }
}

fn print_delta(d: &RunDelta) {
    let errors = match d.errors_resolved {
        0 => "errors unchanged".to_string(),
        n if n > 0 => format!("{} errors resolved", n),
        n => format!("{} new errors", -n),
    };
    let warnings = match d.warnings_resolved {
        0 => "warnings unchanged".to_string(),
        n if n > 0 => format!("{} warnings resolved", n),
        n => format!("{} new warnings", -n),
    };
    println!(
        "~ {} -> {}: {}, {}, clean {}, total {}",
        d.from,
        d.to,
        errors,
        warnings,
        signed(d.clean_delta),
        signed(d.total_delta)
    );
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let quiet = args.iter().any(|a| a == "-q" || a == "--quiet");
    let json = args.iter().any(|a| a == "--json");
    let files: Vec<_> = args.iter().skip(1).filter(|a| !a.starts_with('-')).collect();

    if files.is_empty() {
        eprintln!("Usage: run-compare <stats.json>... [-q|--quiet] [--json]");
        eprintln!("  -q      Quiet: only exit code (0=unchanged, 1=changed)");
        eprintln!("  --json  Print the comparison report as JSON");
        process::exit(2);
    }

    let runs: Vec<RunStats> = files.iter().flat_map(|f| load_stats(f)).collect();
    let report = compare(&runs).unwrap_or_else(|e| {
        eprintln!("run-compare: {}", e);
        process::exit(2);
    });
    let changed = report.has_changes();

    if quiet {
        process::exit(if changed { 1 } else { 0 });
    }

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("run-compare: {}", e);
                process::exit(2);
            }
        }
        process::exit(if changed { 1 } else { 0 });
    }

    for run in report.runs() {
        println!(
            "  {}: {} processed, {} errors, {} warnings, {} clean",
            run.name(),
            run.total_processed(),
            run.errors_found(),
            run.warnings_found(),
            run.clean_logs()
        );
    }

    if !changed {
        println!("No differences.");
        process::exit(0);
    }

    for d in report.deltas() {
        print_delta(d);
    }

    process::exit(1);
}
