//! Agent-facing entry point
//!
//! [`InventoryCheck`] validates in the calling process, so malformed input
//! never costs a worker spawn, and then hands the lookup to the
//! [`Supervisor`].

use std::time::Duration;

use serde_json::Value;

use crate::config::InventoryConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::request::LookupRequest;
use crate::supervisor::Supervisor;

/// Batch availability check with a per-call timeout
#[derive(Debug, Clone)]
pub struct InventoryCheck {
    supervisor: Supervisor,
    timeout: Duration,
}

impl InventoryCheck {
    pub fn new(supervisor: Supervisor, timeout: Duration) -> Self {
        Self {
            supervisor,
            timeout,
        }
    }

    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(Supervisor::from_config(config), config.timeout())
    }

    /// Replace the default timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Check typed input
    pub fn check(
        &self,
        keys: Vec<String>,
        required_amounts: Vec<i64>,
        scope: &str,
    ) -> ResponseEnvelope {
        self.run(LookupRequest::new(keys, required_amounts, scope), None)
    }

    /// Check untyped input, optionally overriding the timeout for this call
    pub fn check_value(
        &self,
        keys: &Value,
        required_amounts: &Value,
        scope: &Value,
        timeout: Option<Duration>,
    ) -> ResponseEnvelope {
        self.run(
            LookupRequest::from_parts(keys, required_amounts, scope),
            timeout,
        )
    }

    /// Check and render for the agent: a JSON array on success, an
    /// `Error: ...` string on failure
    pub fn check_availability(
        &self,
        keys: Vec<String>,
        required_amounts: Vec<i64>,
        scope: &str,
    ) -> String {
        self.check(keys, required_amounts, scope).to_tool_output()
    }

    fn run(&self, request: Result<LookupRequest>, timeout: Option<Duration>) -> ResponseEnvelope {
        match request {
            Ok(request) => self
                .supervisor
                .run(&request, timeout.unwrap_or(self.timeout)),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected lookup before dispatch");
                ResponseEnvelope::from_error(&e)
            }
        }
    }
}
