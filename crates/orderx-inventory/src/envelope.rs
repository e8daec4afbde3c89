//! Lookup results and the response envelope
//!
//! The envelope is the only thing that crosses the worker boundary. It is
//! serialized as one internally tagged JSON object:
//!
//! ```json
//! {"status":"ok","results":[{"key":"AS6647431","available_amount":2500,...}]}
//! {"status":"error","kind":"timeout","message":"worker did not answer within 60s"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix the agent layer uses to recognise a failed call
pub const ERROR_PREFIX: &str = "Error:";

/// Availability verdict for a single requested key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// The requested key, echoed back
    pub key: String,
    /// Quantity available in the data source, 0 when the key had no row
    pub available_amount: u64,
    /// Quantity the caller asked for
    pub required_amount: u64,
    /// `available_amount >= required_amount`
    pub satisfied: bool,
    /// The request scope, echoed back
    pub scope: String,
}

/// Category of a failed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Template,
    Connection,
    Worker,
    Timeout,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Template => write!(f, "template"),
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Worker => write!(f, "worker"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

/// Serializable form of an [`Error`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl From<&Error> for ErrorDescriptor {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

/// Outcome of one lookup: a full result list or an error, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseEnvelope {
    #[serde(rename = "ok")]
    Success { results: Vec<LookupResult> },
    #[serde(rename = "error")]
    Failure(ErrorDescriptor),
}

impl ResponseEnvelope {
    pub fn success(results: Vec<LookupResult>) -> Self {
        Self::Success { results }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure(ErrorDescriptor {
            kind,
            message: message.into(),
        })
    }

    pub fn from_error(err: &Error) -> Self {
        Self::Failure(ErrorDescriptor::from(err))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The error category, if this is a failure
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(descriptor) => Some(descriptor.kind),
        }
    }

    /// Convert back into a typed result on the caller's side
    pub fn into_result(self) -> Result<Vec<LookupResult>> {
        match self {
            Self::Success { results } => Ok(results),
            Self::Failure(descriptor) => Err(Error::from_kind(descriptor.kind, descriptor.message)),
        }
    }

    /// Render for the agent tool layer
    ///
    /// Success becomes the bare JSON array of results; failure becomes a
    /// string starting with [`ERROR_PREFIX`].
    pub fn to_tool_output(&self) -> String {
        match self {
            Self::Success { results } => match serde_json::to_string(results) {
                Ok(json) => json,
                Err(e) => format!("{} worker error: failed to encode results: {}", ERROR_PREFIX, e),
            },
            Self::Failure(descriptor) => format!("{} {}", ERROR_PREFIX, descriptor),
        }
    }
}

impl From<Result<Vec<LookupResult>>> for ResponseEnvelope {
    fn from(result: Result<Vec<LookupResult>>) -> Self {
        match result {
            Ok(results) => Self::success(results),
            Err(err) => Self::from_error(&err),
        }
    }
}
