//! One collection cycle: fetch, derive, publish.
//!
//! [`StashCollector`] drives a cycle through `Fetching`, `Deriving` and
//! `Emitting`. A fetch failure moves straight to `Failed` and the cycle
//! publishes an empty snapshot; health metrics are recorded either way.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::derive::derive_snapshot;
use crate::error::{FetchError, Result};
use crate::prometheus::ScrapeHealth;
use crate::snapshot::Snapshot;
use crate::types::{LibraryStats, Scene};

/// Source of library records for a collection cycle.
///
/// Implementations bound their own I/O with a timeout and report it as
/// [`FetchError::Timeout`].
pub trait StashSource: Send + Sync {
    /// Fetches library-wide totals.
    fn library_stats(&self) -> impl Future<Output = Result<LibraryStats>> + Send;

    /// Fetches every scene with its play and event history.
    fn scenes(&self) -> impl Future<Output = Result<Vec<Scene>>> + Send;
}

/// Phases of a collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// No cycle running.
    Idle,
    /// Waiting on the source.
    Fetching,
    /// Running derivers over the fetched scenes.
    Deriving,
    /// Recording health and handing over the snapshot.
    Emitting,
    /// The cycle completed.
    Succeeded,
    /// The cycle was abandoned.
    Failed,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Deriving => "deriving",
            Self::Emitting => "emitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Content to expose. Empty when the cycle failed.
    pub snapshot: Snapshot,
    /// Terminal phase, either `Succeeded` or `Failed`.
    pub phase: CyclePhase,
    /// Wall time from start to finish.
    pub elapsed: Duration,
    /// Number of scenes fetched. Zero on failure.
    pub scene_count: usize,
    /// Why the cycle failed, if it did.
    pub error: Option<FetchError>,
}

impl CycleReport {
    /// Returns `true` when the cycle completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.phase == CyclePhase::Succeeded
    }
}

/// Runs collection cycles against a source and records exporter health.
pub struct StashCollector<S> {
    source: S,
    health: ScrapeHealth,
}

impl<S> fmt::Debug for StashCollector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StashCollector")
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

impl<S: StashSource> StashCollector<S> {
    /// Creates a collector recording into the given health metrics.
    #[must_use]
    pub const fn new(source: S, health: ScrapeHealth) -> Self {
        Self { source, health }
    }

    /// Returns the health metrics this collector records into.
    #[must_use]
    pub const fn health(&self) -> &ScrapeHealth {
        &self.health
    }

    /// Returns the underlying source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Runs one full cycle.
    ///
    /// Never fails: upstream errors end the cycle in `Failed` with an empty
    /// snapshot, and are logged and counted rather than returned.
    pub async fn collect(&self) -> CycleReport {
        let started = Instant::now();
        transition(CyclePhase::Idle, CyclePhase::Fetching);

        let (stats, scenes) = match self.fetch().await {
            Ok(fetched) => fetched,
            Err(err) => {
                transition(CyclePhase::Fetching, CyclePhase::Failed);
                let elapsed = started.elapsed();
                self.health.record_failure(elapsed);
                error!(
                    error = %err,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "stash scrape failed"
                );
                return CycleReport {
                    snapshot: Snapshot::empty(),
                    phase: CyclePhase::Failed,
                    elapsed,
                    scene_count: 0,
                    error: Some(err),
                };
            }
        };

        transition(CyclePhase::Fetching, CyclePhase::Deriving);
        let snapshot = derive_snapshot(&stats, &scenes);

        transition(CyclePhase::Deriving, CyclePhase::Emitting);
        let elapsed = started.elapsed();
        self.health.record_success(elapsed);
        info!(
            scenes = scenes.len(),
            samples = snapshot.sample_count(),
            elapsed_secs = elapsed.as_secs_f64(),
            "stash scrape completed"
        );
        transition(CyclePhase::Emitting, CyclePhase::Succeeded);

        CycleReport {
            snapshot,
            phase: CyclePhase::Succeeded,
            elapsed,
            scene_count: scenes.len(),
            error: None,
        }
    }

    async fn fetch(&self) -> Result<(LibraryStats, Vec<Scene>)> {
        let stats = self.source.library_stats().await?;
        let scenes = self.source.scenes().await?;
        Ok((stats, scenes))
    }
}

fn transition(from: CyclePhase, to: CyclePhase) {
    debug!(%from, %to, "collection cycle transition");
}
