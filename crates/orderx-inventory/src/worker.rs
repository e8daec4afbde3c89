//! Worker side of the process boundary
//!
//! A worker process reads exactly one [`WorkerJob`] as a JSON line from
//! stdin, runs the whole lookup pipeline, and writes exactly one
//! [`ResponseEnvelope`] line to stdout. Everything the worker opens
//! (drivers, connections, the template file) dies with the process.

use std::io::Write;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::envelope::{LookupResult, ResponseEnvelope};
use crate::error::{Error, Result};
use crate::executor::{ConnectionDescriptor, DriverRegistry, execute};
use crate::request::LookupRequest;
use crate::template::SqlTemplate;

/// Everything a worker needs to answer one lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerJob {
    /// Correlates supervisor and worker log lines
    pub run_id: Uuid,
    /// The request exactly as it will be validated inside the worker
    pub request: Value,
    pub connection: ConnectionDescriptor,
    /// Path to the SQL template file
    pub template: PathBuf,
}

impl WorkerJob {
    pub fn new(
        run_id: Uuid,
        request: &LookupRequest,
        connection: ConnectionDescriptor,
        template: PathBuf,
    ) -> Result<Self> {
        let request = serde_json::to_value(request)
            .map_err(|e| Error::worker(format!("failed to encode request: {}", e)))?;
        Ok(Self {
            run_id,
            request,
            connection,
            template,
        })
    }
}

/// Answer one job line
///
/// Never panics and never returns an error: every failure, including a
/// panic in a driver, ends up in the envelope.
pub fn serve(input: &str, registry: &DriverRegistry) -> ResponseEnvelope {
    match catch_unwind(AssertUnwindSafe(|| handle(input, registry))) {
        Ok(outcome) => ResponseEnvelope::from(outcome),
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            ResponseEnvelope::from_error(&Error::worker(format!("worker panicked: {}", detail)))
        }
    }
}

fn handle(input: &str, registry: &DriverRegistry) -> Result<Vec<LookupResult>> {
    let job: WorkerJob = serde_json::from_str(input.trim())
        .map_err(|e| Error::worker(format!("malformed job: {}", e)))?;
    let span = tracing::info_span!("lookup", run_id = %job.run_id);
    let _guard = span.enter();

    let request = LookupRequest::from_value(&job.request)?;
    let template = SqlTemplate::load(&job.template)?;
    tracing::debug!(
        keys = request.len(),
        template = %job.template.display(),
        "Running lookup"
    );

    let rows = execute(registry, &job.connection, &template, &request)?;
    let results = aggregate(&request, &rows);
    tracing::info!(
        keys = results.len(),
        satisfied = results.iter().filter(|r| r.satisfied).count(),
        "Lookup complete"
    );
    Ok(results)
}

/// Write the envelope as a single JSON line and flush
pub fn write_envelope<W: Write>(
    writer: &mut W,
    envelope: &ResponseEnvelope,
) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, envelope)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
