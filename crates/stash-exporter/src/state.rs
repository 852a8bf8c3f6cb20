//! Shared state for the exporter server.

use std::sync::Arc;

use stash_client::StashClient;
use stash_metrics::{
    CycleReport, Exposition, ScrapeHealth, SnapshotSlot, StashCollector, StashSource,
};

use crate::config::{ExportMode, ExporterConfig};
use crate::error::ExporterResult;

/// State shared by the HTTP handlers and the interval loop.
pub struct ExporterState<S> {
    /// Exporter configuration.
    config: Arc<ExporterConfig>,
    /// Runs cycles and records health.
    collector: StashCollector<S>,
    /// Renders snapshots with the shared health metrics.
    exposition: Exposition,
    /// Latest snapshot produced by the interval loop.
    latest: SnapshotSlot,
}

impl<S> std::fmt::Debug for ExporterState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterState")
            .field("config", &self.config)
            .field("health", self.exposition.health())
            .finish_non_exhaustive()
    }
}

impl ExporterState<StashClient> {
    /// Validates the config and builds state around a Stash client for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the client cannot be built.
    pub fn connect(config: ExporterConfig) -> ExporterResult<Self> {
        config.validate()?;
        let client = StashClient::new(&config.stash_url, config.api_key.clone(), config.timeout)?;
        Ok(Self::new(config, client))
    }
}

impl<S: StashSource> ExporterState<S> {
    /// Create exporter state around a source.
    pub fn new(config: ExporterConfig, source: S) -> Self {
        let health = ScrapeHealth::new();
        Self {
            config: Arc::new(config),
            collector: StashCollector::new(source, health.clone()),
            exposition: Exposition::new(health),
            latest: SnapshotSlot::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Execution mode.
    pub fn mode(&self) -> ExportMode {
        self.config.mode
    }

    /// Get the collector.
    pub fn collector(&self) -> &StashCollector<S> {
        &self.collector
    }

    /// Get the exposition.
    pub fn exposition(&self) -> &Exposition {
        &self.exposition
    }

    /// Get the latest-snapshot slot.
    pub fn latest(&self) -> &SnapshotSlot {
        &self.latest
    }

    /// Runs one cycle and publishes its snapshot, replacing the previous one.
    pub async fn run_cycle(&self) -> CycleReport {
        let report = self.collector.collect().await;
        self.latest.publish(report.snapshot.clone());
        report
    }

    /// Produces the `/metrics` body for the configured mode.
    ///
    /// In pull mode this runs a private cycle for the caller; concurrent callers
    /// never share a snapshot, and `stash_up` and the duration describe the
    /// caller's own cycle. The attempt counters are process-wide in both modes.
    /// In interval mode it renders the latest snapshot.
    pub async fn render_metrics(&self) -> String {
        match self.config.mode {
            ExportMode::Pull => self.exposition.render_cycle(self.collector.collect().await),
            ExportMode::Interval => self.exposition.render(self.latest.latest()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{make_state, tagged_scene, FakeSource};
    use crate::error::ExporterError;
    use stash_metrics::ScrapeStatus;

    #[tokio::test]
    async fn test_pull_mode_runs_cycle_per_render() {
        let state = make_state(ExportMode::Pull, FakeSource::up(vec![tagged_scene("1", "hd")]));

        let first = state.render_metrics().await;
        let second = state.render_metrics().await;

        assert_eq!(state.collector().source().cycles(), 2);
        assert!(first.contains("tag_name=\"hd\""));
        assert!(second.contains("stash_scrapes_total{status=\"success\"} 2"));
    }

    #[tokio::test]
    async fn test_pull_mode_reflects_current_data() {
        let state = make_state(ExportMode::Pull, FakeSource::up(vec![tagged_scene("1", "old")]));
        assert!(state.render_metrics().await.contains("tag_name=\"old\""));

        state
            .collector()
            .source()
            .set_scenes(Some(vec![tagged_scene("1", "new")]));
        let body = state.render_metrics().await;

        assert!(!body.contains("tag_name=\"old\""));
        assert!(body.contains("tag_name=\"new\""));
    }

    #[tokio::test]
    async fn test_interval_mode_serves_latest_without_fetching() {
        let state = make_state(ExportMode::Interval, FakeSource::up(vec![tagged_scene("1", "hd")]));

        let before = state.render_metrics().await;
        assert_eq!(state.collector().source().cycles(), 0);
        assert!(!before.contains("stash_tag_usage_count"));
        assert!(before.contains("stash_up 0"));

        state.run_cycle().await;
        let after = state.render_metrics().await;

        assert_eq!(state.collector().source().cycles(), 1);
        assert!(after.contains("tag_name=\"hd\""));
        assert!(after.contains("stash_up 1"));
    }

    #[tokio::test]
    async fn test_failed_cycle_replaces_content() {
        let state = make_state(ExportMode::Interval, FakeSource::up(vec![tagged_scene("1", "hd")]));
        state.run_cycle().await;
        assert!(!state.latest().latest().is_empty());

        state.collector().source().set_scenes(None);
        let report = state.run_cycle().await;

        assert!(!report.is_success());
        assert!(state.latest().latest().is_empty());
        assert_eq!(state.exposition().health().scrapes(ScrapeStatus::Failure), 1);
    }

    #[tokio::test]
    async fn test_pull_render_reports_own_cycle() {
        let state = make_state(ExportMode::Pull, FakeSource::up(vec![tagged_scene("1", "hd")]));
        // Leave the shared gauge describing a failed cycle.
        state
            .exposition()
            .health()
            .record_failure(std::time::Duration::from_secs(1));

        let body = state.render_metrics().await;

        assert!(body.contains("tag_name=\"hd\""));
        assert!(body.contains("stash_up 1"));
        assert!(body.contains("stash_scrapes_total{status=\"failure\"} 1"));
    }

    #[test]
    fn test_connect_builds_client() {
        let config = ExporterConfig::default()
            .with_stash_url("http://127.0.0.1:9999/graphql/")
            .with_api_key("secret");

        let state = ExporterState::connect(config).unwrap();

        assert_eq!(state.collector().source().url(), "http://127.0.0.1:9999/graphql");
        assert!(state.collector().source().has_api_key());
    }

    #[test]
    fn test_connect_rejects_invalid_config() {
        let config = ExporterConfig::default().with_timeout(std::time::Duration::ZERO);

        let err = ExporterState::connect(config).unwrap_err();

        assert!(matches!(err, ExporterError::Config(_)));
    }

    #[test]
    fn test_accessors() {
        let state = make_state(ExportMode::Interval, FakeSource::down());

        assert_eq!(state.mode(), ExportMode::Interval);
        assert_eq!(state.config().listen_addr.port(), 9100);
        assert!(format!("{state:?}").contains("ExporterState"));
    }
}
