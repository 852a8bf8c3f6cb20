//! Exporter server implementation.

use std::sync::Arc;

use stash_metrics::StashSource;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ExportMode;
use crate::error::{ExporterError, ExporterResult};
use crate::routes::create_router;
use crate::scheduler::run_interval_loop;
use crate::state::ExporterState;

/// HTTP server exposing `/metrics` and `/health`.
///
/// In interval mode it also owns the background scrape loop, which stops with
/// the server.
pub struct ExporterServer<S> {
    state: Arc<ExporterState<S>>,
}

impl<S> std::fmt::Debug for ExporterServer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterServer")
            .field("state", &self.state)
            .finish()
    }
}

impl<S> Clone for ExporterServer<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: StashSource + 'static> ExporterServer<S> {
    /// Create a server around shared state.
    #[must_use]
    pub fn new(state: ExporterState<S>) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Get the exporter state for external access.
    #[must_use]
    pub fn state(&self) -> Arc<ExporterState<S>> {
        Arc::clone(&self.state)
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(Arc::clone(&self.state))
    }

    /// Bind the configured address and serve until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the server stops abnormally.
    pub async fn run(&self, cancel: CancellationToken) -> ExporterResult<()> {
        let addr = self.state.config().listen_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ExporterError::BindFailed(addr, e))?;
        self.run_on(listener, cancel).await
    }

    /// Serve on an already bound listener until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the server stops abnormally.
    pub async fn run_on(
        &self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> ExporterResult<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(addr = %addr, mode = %self.state.mode(), "Exporter listening");
        }

        let scrape_loop = match self.state.mode() {
            ExportMode::Interval => Some(tokio::spawn(run_interval_loop(
                Arc::clone(&self.state),
                cancel.child_token(),
            ))),
            ExportMode::Pull => None,
        };

        let shutdown = cancel.clone();
        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| ExporterError::Serve(e.to_string()));

        // A serve error must still stop the loop.
        cancel.cancel();
        if let Some(handle) = scrape_loop {
            if let Err(e) = handle.await {
                warn!(error = %e, "scrape loop ended abnormally");
            }
        }

        served?;
        info!("Exporter shut down");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c"),
        () = terminate => info!("received SIGTERM"),
    }
}
