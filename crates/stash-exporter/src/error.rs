//! Error types for the exporter process.

use thiserror::Error;

/// Result type alias for exporter operations.
pub type ExporterResult<T> = Result<T, ExporterError>;

/// Errors that can stop the exporter.
///
/// Upstream failures are not here: they end a collection cycle, never the process.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The Stash client could not be created.
    #[error("client error: {0}")]
    Client(#[from] stash_client::ClientError),
}
