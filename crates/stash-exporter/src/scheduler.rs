//! Background loop for interval mode.
//!
//! One cycle per interval, measured start to start. Cancellation interrupts
//! the sleep between cycles at once but never a cycle in progress.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stash_metrics::StashSource;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::state::ExporterState;

/// Time to wait after a cycle that took `elapsed`, never negative.
#[must_use]
pub fn next_delay(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// Runs cycles until `cancel` fires.
pub async fn run_interval_loop<S: StashSource>(
    state: Arc<ExporterState<S>>,
    cancel: CancellationToken,
) {
    let interval = state.config().scrape_interval;
    info!(interval_secs = interval.as_secs(), "starting scrape loop");

    loop {
        let started = Instant::now();
        state.run_cycle().await;

        if cancel.is_cancelled() {
            break;
        }

        let delay = next_delay(interval, started.elapsed());
        debug!(delay_secs = delay.as_secs_f64(), "sleeping until next cycle");
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = cancel.cancelled() => break,
        }
    }

    info!("scrape loop stopped");
}
