//! Error types for inventory lookups

use crate::envelope::ErrorKind;

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while checking inventory
///
/// Inside a single process these travel as ordinary `Result`s. Across the
/// worker boundary only their [`ErrorKind`] and message survive, carried by
/// an [`ErrorDescriptor`](crate::envelope::ErrorDescriptor).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request shape is invalid; nothing was spawned or opened
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The SQL template is unreadable or breaks the membership-token contract
    #[error("template error: {message}")]
    Template { message: String },

    /// The data source could not be reached or refused the connection
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Any other fault inside the worker process
    #[error("worker error: {message}")]
    Worker { message: String },

    /// The worker exceeded its wall-clock budget and was killed
    #[error("timeout error: {message}")]
    Timeout { message: String },

    /// Configuration could not be loaded or is incomplete
    #[error("config error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Rebuild an error from a kind and message received over the wire
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        match kind {
            ErrorKind::Validation => Self::validation(message),
            ErrorKind::Template => Self::template(message),
            ErrorKind::Connection => Self::connection(message),
            ErrorKind::Worker => Self::worker(message),
            ErrorKind::Timeout => Self::timeout(message),
            ErrorKind::Config => Self::config(message),
        }
    }

    /// The category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Template { .. } => ErrorKind::Template,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Worker { .. } => ErrorKind::Worker,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Template { message }
            | Self::Connection { message }
            | Self::Worker { message }
            | Self::Timeout { message }
            | Self::Config { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_prefix() {
        let err = Error::validation("keys must not be empty");
        assert_eq!(err.to_string(), "validation error: keys must not be empty");
        assert_eq!(err.message(), "keys must not be empty");
    }

    #[test]
    fn kind_round_trips_through_from_kind() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::Template,
            ErrorKind::Connection,
            ErrorKind::Worker,
            ErrorKind::Timeout,
            ErrorKind::Config,
        ] {
            let err = Error::from_kind(kind, "boom");
            assert_eq!(err.kind(), kind);
            assert_eq!(err.message(), "boom");
        }
    }
}
