//! Error types for the stash-metrics crate.
//!
//! Only failures of the fetch collaborator are represented here. Malformed
//! timestamps and numeric fields are absorbed where they are read and never
//! surface as errors.

use thiserror::Error;

/// Errors reported by a [`StashSource`](crate::collector::StashSource).
///
/// The snapshot collector treats every variant the same way: the cycle fails
/// and no content-derived series are published.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The upstream could not be reached (connection refused, DNS, reset).
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("timeout: {operation} did not complete within {timeout_secs} seconds")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// Timeout duration in seconds.
        timeout_secs: u64,
    },

    /// The upstream answered, but not with a usable GraphQL payload.
    #[error("protocol error: {message}")]
    Protocol {
        /// Description of the protocol failure.
        message: String,
    },

    /// The payload was valid GraphQL but lacked an expected top-level field.
    #[error("unexpected response shape: missing field '{field}'")]
    Shape {
        /// The missing field path.
        field: String,
    },
}

impl FetchError {
    /// Creates a `Transport` error with a message.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
        }
    }

    /// Creates a `Protocol` error with a message.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a `Shape` error for the given field path.
    #[must_use]
    pub fn shape(field: impl Into<String>) -> Self {
        Self::Shape {
            field: field.into(),
        }
    }

    /// Returns `true` for connection-level failures, timeouts included.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    /// Returns `true` when the upstream answered with something unusable.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::Shape { .. })
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
