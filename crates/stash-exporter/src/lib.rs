//! # stash-exporter
//!
//! HTTP exporter publishing Stash library statistics as Prometheus metrics.
//!
//! The exporter runs in one of two modes:
//!
//! - **pull** (default): every `/metrics` request fetches from Stash and
//!   renders a fresh snapshot.
//! - **interval**: a background loop refreshes the snapshot on a fixed
//!   interval and `/metrics` serves the latest one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_exporter::{ExporterConfig, ExporterServer, ExporterState};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExporterConfig::default();
//!     let server = ExporterServer::new(ExporterState::connect(config)?);
//!     server.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/metrics` | GET | OpenMetrics exposition |
//! | `/health` | GET | Exporter liveness |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod scheduler;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use config::{Cli, ExportMode, ExporterConfig};
pub use error::{ExporterError, ExporterResult};
pub use server::{shutdown_signal, ExporterServer};
pub use state::ExporterState;
