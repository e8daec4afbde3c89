//! Supervisor side of the process boundary
//!
//! Every lookup runs in a freshly spawned worker process. The supervisor
//! hands the job over on the worker's stdin, waits for a single envelope
//! line on its stdout, and enforces a hard deadline:
//!
//! ```text
//! supervisor                      io thread                 worker
//!     | spawn ------------------------------------------------> |
//!     | start ----------------------> | -- job line ----------> |
//!     | recv_timeout(deadline)        | <-- envelope line ----- |
//!     | <---------- envelope -------- |                         |
//!     | hand off to reaper thread: wait (grace) / kill ---------> |
//! ```
//!
//! The envelope is returned as soon as it arrives; an answered worker that
//! lingers is left to a reaper thread. If the deadline passes first the
//! worker is killed and reaped, and the caller gets a timeout envelope. A
//! worker that dies without answering closes its stdout, so the io thread
//! sees EOF and the caller gets a worker error straight away instead of
//! waiting out the deadline.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, SendError};
use uuid::Uuid;

use crate::config::InventoryConfig;
use crate::envelope::{ErrorKind, ResponseEnvelope};
use crate::error::{Error, Result};
use crate::executor::ConnectionDescriptor;
use crate::request::LookupRequest;
use crate::worker::WorkerJob;

/// File name of the worker binary built by this crate
pub const WORKER_BINARY: &str = "orderx-inventory-worker";

/// How long a worker may take to exit on its own after answering
const EXIT_GRACE: Duration = Duration::from_secs(2);
const REAP_POLL: Duration = Duration::from_millis(10);

/// How to launch a worker process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The worker binary next to the running executable, falling back to
    /// a `PATH` lookup
    pub fn locate() -> Self {
        let sibling = std::env::current_exe().ok().and_then(|exe| {
            let candidate = exe
                .parent()?
                .join(format!("{}{}", WORKER_BINARY, std::env::consts::EXE_SUFFIX));
            candidate.is_file().then_some(candidate)
        });
        match sibling {
            Some(path) => Self::new(path),
            None => Self::new(WORKER_BINARY),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        command
    }
}

/// Runs lookups in isolated worker processes
#[derive(Debug, Clone)]
pub struct Supervisor {
    command: WorkerCommand,
    connection: ConnectionDescriptor,
    template: PathBuf,
}

impl Supervisor {
    pub fn new(
        command: WorkerCommand,
        connection: ConnectionDescriptor,
        template: impl Into<PathBuf>,
    ) -> Self {
        Self {
            command,
            connection,
            template: template.into(),
        }
    }

    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(
            config.worker_command(),
            config.connection.clone(),
            config.query.template.clone(),
        )
    }

    pub fn command(&self) -> &WorkerCommand {
        &self.command
    }

    /// Run one lookup in a new worker, waiting at most `timeout`
    ///
    /// Always returns an envelope; failures to spawn, talk to, or hear back
    /// from the worker are reported inside it. Blocks no longer than
    /// `timeout` plus the time to kill a worker that missed it. A worker
    /// that answered but has not exited yet is reaped in the background.
    pub fn run(&self, request: &LookupRequest, timeout: Duration) -> ResponseEnvelope {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(
            %run_id,
            keys = request.len(),
            program = %self.command.program.display(),
            timeout_ms = timeout.as_millis() as u64,
            "Dispatching lookup to worker"
        );

        let envelope = match self.dispatch(run_id, request, timeout) {
            Ok(envelope) => envelope,
            Err(e) => ResponseEnvelope::from_error(&e),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match envelope.error_kind() {
            None => tracing::info!(%run_id, elapsed_ms, "Worker answered"),
            Some(ErrorKind::Timeout) => tracing::warn!(%run_id, elapsed_ms, "Worker timed out"),
            Some(kind) => tracing::info!(%run_id, elapsed_ms, %kind, "Worker reported an error"),
        }
        envelope
    }

    fn dispatch(
        &self,
        run_id: Uuid,
        request: &LookupRequest,
        timeout: Duration,
    ) -> Result<ResponseEnvelope> {
        let job = WorkerJob::new(
            run_id,
            request,
            self.connection.clone(),
            self.template.clone(),
        )?;
        let line = serde_json::to_string(&job)
            .map_err(|e| Error::worker(format!("failed to encode job: {}", e)))?;

        let mut child = self.command.command().spawn().map_err(|e| {
            Error::worker(format!(
                "failed to start worker {}: {}",
                self.command.program.display(),
                e
            ))
        })?;
        tracing::debug!(%run_id, pid = child.id(), "Worker started");

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let spawned = thread::Builder::new()
            .name("orderx-worker-io".to_string())
            .spawn(move || {
                // The receiver is gone once the supervisor has given up.
                let _ = tx.send(exchange(stdin, stdout, &line));
            });
        if let Err(e) = spawned {
            terminate(&mut child);
            return Err(Error::worker(format!("failed to start worker io thread: {}", e)));
        }

        match rx.recv_timeout(timeout) {
            Ok(Ok(envelope)) => {
                release(child);
                Ok(envelope)
            }
            Ok(Err(e)) => {
                let status = reap(&mut child);
                Err(Error::worker(match status {
                    Some(status) => format!("{} ({})", e.message(), status),
                    None => e.message().to_string(),
                }))
            }
            Err(RecvTimeoutError::Timeout) => {
                terminate(&mut child);
                Err(Error::timeout(format!(
                    "worker did not answer within {}",
                    describe(timeout)
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                terminate(&mut child);
                Err(Error::worker("worker io thread exited without a result"))
            }
        }
    }
}

/// Send the job line, close stdin, and read one envelope line back
fn exchange(
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    line: &str,
) -> Result<ResponseEnvelope> {
    let mut stdin = stdin.ok_or_else(|| Error::worker("worker stdin was not captured"))?;
    let stdout = stdout.ok_or_else(|| Error::worker("worker stdout was not captured"))?;

    // A worker that died early closes its end; the read below reports it.
    if let Err(e) = stdin
        .write_all(line.as_bytes())
        .and_then(|_| stdin.write_all(b"\n"))
        .and_then(|_| stdin.flush())
    {
        tracing::debug!(error = %e, "Failed to hand job to worker");
    }
    drop(stdin);

    let mut response = String::new();
    let read = BufReader::new(stdout)
        .read_line(&mut response)
        .map_err(|e| Error::worker(format!("failed to read worker response: {}", e)))?;
    if read == 0 {
        return Err(Error::worker("worker exited without a response"));
    }
    serde_json::from_str(response.trim())
        .map_err(|e| Error::worker(format!("malformed worker response: {}", e)))
}

/// Hand an answered worker to a reaper thread so the caller does not wait
/// out its shutdown
fn release(mut child: Child) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }

    let (tx, rx) = crossbeam_channel::bounded::<Child>(1);
    let spawned = thread::Builder::new()
        .name("orderx-worker-reaper".to_string())
        .spawn(move || {
            if let Ok(mut child) = rx.recv() {
                finish(&mut child);
            }
        });
    match spawned {
        Ok(_) => {
            if let Err(SendError(mut child)) = tx.send(child) {
                terminate(&mut child);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to start reaper thread, killing worker");
            terminate(&mut child);
        }
    }
}

/// Give an answered worker a grace period to exit, then kill it
fn finish(child: &mut Child) {
    if let Some(status) = reap(child) {
        if !status.success() {
            tracing::debug!(%status, "Worker exited unsuccessfully after answering");
        }
    }
}

/// Wait up to the grace period for the child to exit, killing it if it
/// does not
fn reap(child: &mut Child) -> Option<ExitStatus> {
    let deadline = Instant::now() + EXIT_GRACE;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) if Instant::now() < deadline => thread::sleep(REAP_POLL),
            Ok(None) => {
                tracing::debug!(pid = child.id(), "Worker still running after grace period");
                terminate(child);
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to poll worker status");
                terminate(child);
                return None;
            }
        }
    }
}

/// Kill and reap the child
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        // Already exited is fine; wait() below still reaps it.
        tracing::debug!(error = %e, "Failed to kill worker");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "Failed to reap worker");
    }
}

fn describe(timeout: Duration) -> String {
    if timeout.subsec_millis() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}
