//! Isolated inventory lookup worker
//!
//! Reads one job line from stdin, answers with one envelope line on stdout,
//! and exits. Logs go to stderr, which the supervisor shares with the
//! caller, so only warnings are shown unless `RUST_LOG` asks for more.
//!
//! The process is started by the supervisor for every lookup and is not
//! meant to be run by hand.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use orderx_inventory::DriverRegistry;
use orderx_inventory::worker::{serve, write_envelope};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // stdout carries the envelope and nothing else
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("orderx_inventory=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut line = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
        tracing::error!(error = %e, "Failed to read job from stdin");
        return ExitCode::FAILURE;
    }

    let registry = DriverRegistry::with_builtin();
    let envelope = serve(&line, &registry);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match write_envelope(&mut out, &envelope).and_then(|_| out.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Failed to write response envelope");
            ExitCode::FAILURE
        }
    }
}
