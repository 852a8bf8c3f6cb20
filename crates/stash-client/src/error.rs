//! Error types for Stash GraphQL calls.
//!
//! Every variant maps onto the collector's [`FetchError`] taxonomy: request and
//! timeout failures are transport errors, everything the server answered with
//! but we could not use is a protocol error, and missing top-level fields are
//! shape errors.

use stash_metrics::FetchError;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while querying Stash.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be built.
    #[error("client setup failed: {message}")]
    Setup {
        /// Description of the setup failure.
        message: String,
    },

    /// The request never produced a response.
    #[error("error connecting to Stash GraphQL at {url}: {message}")]
    Request {
        /// Endpoint that was called.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The request exceeded the configured timeout.
    #[error("timeout: {operation} did not complete within {timeout_secs} seconds")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// Timeout duration in seconds.
        timeout_secs: u64,
    },

    /// The server answered with a non-200 status.
    #[error("unexpected status code {status} from Stash GraphQL: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The body was not JSON.
    #[error("invalid JSON received from Stash GraphQL: {message}")]
    InvalidBody {
        /// Decoder message.
        message: String,
    },

    /// The response carried a non-empty `errors` list.
    #[error("GraphQL errors returned from Stash: {}", messages.join("; "))]
    GraphQl {
        /// Error messages reported by the server.
        messages: Vec<String>,
    },

    /// The response had no `data` field.
    #[error("GraphQL response missing 'data' field")]
    MissingData,

    /// `data` lacked an expected top-level field.
    #[error("GraphQL response missing field '{field}'")]
    MissingField {
        /// The missing field path.
        field: String,
    },
}

impl ClientError {
    /// Creates a `Request` error.
    #[must_use]
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
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

    /// Creates a `MissingField` error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Returns `true` if no response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Timeout { .. })
    }
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Timeout {
                operation,
                timeout_secs,
            } => Self::timeout(operation, timeout_secs),
            ClientError::MissingField { field } => Self::shape(field),
            err @ (ClientError::Request { .. } | ClientError::Setup { .. }) => {
                Self::transport(err.to_string())
            }
            err @ (ClientError::Status { .. }
            | ClientError::InvalidBody { .. }
            | ClientError::GraphQl { .. }
            | ClientError::MissingData) => Self::protocol(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_request_error_display() {
        let err = ClientError::request("http://stash:9999/graphql", "connection refused");
        assert_eq!(
            err.to_string(),
            "error connecting to Stash GraphQL at http://stash:9999/graphql: connection refused"
        );
    }

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected status code 502 from Stash GraphQL: bad gateway"
        );
    }

    #[test]
    fn test_graphql_error_display_joins_messages() {
        let err = ClientError::GraphQl {
            messages: vec!["first".into(), "second".into()],
        };
        assert_eq!(err.to_string(), "GraphQL errors returned from Stash: first; second");
    }

    #[test]
    fn test_missing_data_display() {
        assert_eq!(
            ClientError::MissingData.to_string(),
            "GraphQL response missing 'data' field"
        );
    }

    #[test]
    fn test_is_transport() {
        assert!(ClientError::request("u", "m").is_transport());
        assert!(ClientError::timeout("stats", 10).is_transport());
        assert!(!ClientError::MissingData.is_transport());
    }

    #[test_case(ClientError::request("u", "refused"), true, false ; "request")]
    #[test_case(ClientError::timeout("stats", 5), true, false ; "timeout")]
    #[test_case(ClientError::Setup { message: "tls".into() }, true, false ; "setup")]
    #[test_case(ClientError::Status { status: 500, body: String::new() }, false, true ; "status")]
    #[test_case(ClientError::InvalidBody { message: "eof".into() }, false, true ; "invalid body")]
    #[test_case(ClientError::GraphQl { messages: vec![] }, false, true ; "graphql")]
    #[test_case(ClientError::MissingData, false, true ; "missing data")]
    #[test_case(ClientError::missing_field("stats"), false, true ; "missing field")]
    fn test_maps_onto_fetch_taxonomy(err: ClientError, transport: bool, protocol: bool) {
        let fetch = FetchError::from(err);
        assert_eq!(fetch.is_transport(), transport);
        assert_eq!(fetch.is_protocol(), protocol);
    }

    #[test]
    fn test_missing_field_becomes_shape_error() {
        let fetch = FetchError::from(ClientError::missing_field("findScenes"));
        assert_eq!(fetch, FetchError::shape("findScenes"));
    }

    #[test]
    fn test_timeout_keeps_operation() {
        let fetch = FetchError::from(ClientError::timeout("findScenes", 10));
        assert_eq!(fetch, FetchError::timeout("findScenes", 10));
    }
}
