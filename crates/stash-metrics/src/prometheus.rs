//! Prometheus exposition for collection snapshots.
//!
//! Two lifetimes meet here. [`ScrapeHealth`] lives for the whole process and
//! describes the exporter itself; its counters only ever move forward. Content
//! comes from a [`Snapshot`] and is re-encoded from scratch on every render
//! through a fresh [`Registry`], so nothing from an earlier cycle can leak into
//! the output.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use stash_metrics::prometheus::{Exposition, ScrapeHealth};
//! use stash_metrics::snapshot::{MetricFamily, Snapshot};
//!
//! let health = ScrapeHealth::new();
//! health.record_success(Duration::from_millis(250));
//!
//! let mut snapshot = Snapshot::empty();
//! snapshot.push(MetricFamily::single("stash_scenes_total", "Total scenes.", 42.0));
//!
//! let output = Exposition::new(health).render(Arc::new(snapshot));
//! assert!(output.contains("stash_scenes_total"));
//! assert!(output.contains("stash_up 1"));
//! ```

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use prometheus_client::collector::Collector;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{DescriptorEncoder, EncodeLabelSet, EncodeMetric};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::{ConstGauge, Gauge};
use prometheus_client::metrics::MetricType;
use prometheus_client::registry::Registry;

use crate::collector::CycleReport;
use crate::snapshot::{MetricFamily, Snapshot};

/// Outcome of one collection cycle, as exported on the attempts counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeStatus {
    /// Fetch and derivation completed.
    Success,
    /// The cycle was abandoned.
    Failure,
}

impl ScrapeStatus {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Label set for the attempts counter.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ScrapeStatusLabels {
    /// Either `success` or `failure`.
    pub status: String,
}

impl From<ScrapeStatus> for ScrapeStatusLabels {
    fn from(status: ScrapeStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
        }
    }
}

/// Self-health metrics that persist across cycles.
///
/// Clones share the same underlying atomics, so the collector can record while
/// HTTP handlers render concurrently.
#[derive(Clone)]
pub struct ScrapeHealth {
    /// 1 when the last cycle succeeded, 0 otherwise.
    up: Gauge,
    /// Wall time of the last cycle.
    duration_seconds: Gauge<f64, AtomicU64>,
    /// Cycles by outcome.
    scrapes: Family<ScrapeStatusLabels, Counter>,
}

impl std::fmt::Debug for ScrapeHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeHealth")
            .field("up", &self.up.get())
            .field("duration_seconds", &self.duration_seconds.get())
            .finish_non_exhaustive()
    }
}

impl Default for ScrapeHealth {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeHealth {
    /// Creates health metrics with both outcome series present at zero.
    #[must_use]
    pub fn new() -> Self {
        let scrapes = Family::<ScrapeStatusLabels, Counter>::default();
        scrapes.get_or_create(&ScrapeStatus::Success.into());
        scrapes.get_or_create(&ScrapeStatus::Failure.into());

        Self {
            up: Gauge::default(),
            duration_seconds: Gauge::default(),
            scrapes,
        }
    }

    /// Records a successful cycle.
    pub fn record_success(&self, elapsed: Duration) {
        self.record(ScrapeStatus::Success, elapsed);
    }

    /// Records a failed cycle.
    pub fn record_failure(&self, elapsed: Duration) {
        self.record(ScrapeStatus::Failure, elapsed);
    }

    fn record(&self, status: ScrapeStatus, elapsed: Duration) {
        self.up.set(i64::from(status == ScrapeStatus::Success));
        self.duration_seconds.set(elapsed.as_secs_f64());
        self.scrapes.get_or_create(&status.into()).inc();
    }

    /// Returns `true` when the last recorded cycle succeeded.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.up.get() == 1
    }

    /// Duration of the last recorded cycle in seconds.
    #[must_use]
    pub fn last_duration_seconds(&self) -> f64 {
        self.duration_seconds.get()
    }

    /// Number of cycles recorded with the given outcome.
    #[must_use]
    pub fn scrapes(&self, status: ScrapeStatus) -> u64 {
        self.scrapes.get_or_create(&status.into()).get()
    }

    /// A view whose gauges describe one finished cycle. Attempt counters stay
    /// shared with `self`.
    #[must_use]
    pub fn for_cycle(&self, succeeded: bool, elapsed: Duration) -> Self {
        let view = Self {
            up: Gauge::default(),
            duration_seconds: Gauge::default(),
            scrapes: self.scrapes.clone(),
        };
        view.up.set(i64::from(succeeded));
        view.duration_seconds.set(elapsed.as_secs_f64());
        view
    }

    fn register(&self, registry: &mut Registry) {
        registry.register(
            "stash_up",
            "Whether the last scrape of Stash GraphQL succeeded (1 for success, 0 for failure)",
            self.up.clone(),
        );
        registry.register(
            "stash_scrape_duration_seconds",
            "Time spent on the last scrape in seconds",
            self.duration_seconds.clone(),
        );
        // The encoder appends `_total` to counters.
        registry.register(
            "stash_scrapes",
            "Number of scrape attempts by outcome",
            self.scrapes.clone(),
        );
    }
}

/// Encodes a snapshot's families as gauges, in snapshot order.
#[derive(Debug)]
struct SnapshotCollector {
    snapshot: Arc<Snapshot>,
}

impl Collector for SnapshotCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), std::fmt::Error> {
        for family in self.snapshot.families() {
            encode_family(&mut encoder, family)?;
        }
        Ok(())
    }
}

fn encode_family(
    encoder: &mut DescriptorEncoder,
    family: &MetricFamily,
) -> Result<(), std::fmt::Error> {
    let mut metric_encoder =
        encoder.encode_descriptor(family.name, family.help, None, MetricType::Gauge)?;

    if !family.is_labeled() {
        if let Some(sample) = family.samples.first() {
            ConstGauge::new(sample.value).encode(metric_encoder)?;
        }
        return Ok(());
    }

    for sample in &family.samples {
        let escaped: Vec<String> = sample
            .label_values
            .iter()
            .map(|value| escape_label_value(value))
            .collect();
        let labels: Vec<(&str, &str)> = family
            .label_keys
            .iter()
            .copied()
            .zip(escaped.iter().map(String::as_str))
            .collect();
        ConstGauge::new(sample.value).encode(metric_encoder.encode_family(&labels)?)?;
    }
    Ok(())
}

/// Escapes a label value for the text format. The encoder writes values as-is.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders snapshots together with the process-wide health metrics.
#[derive(Clone, Debug, Default)]
pub struct Exposition {
    health: ScrapeHealth,
}

impl Exposition {
    /// Creates an exposition over shared health metrics.
    #[must_use]
    pub const fn new(health: ScrapeHealth) -> Self {
        Self { health }
    }

    /// Returns the health metrics rendered alongside every snapshot.
    #[must_use]
    pub const fn health(&self) -> &ScrapeHealth {
        &self.health
    }

    /// Encodes the snapshot together with the health metrics.
    ///
    /// Content families keep snapshot order. Encoding failures are logged and
    /// produce an empty body.
    #[must_use]
    pub fn render(&self, snapshot: Arc<Snapshot>) -> String {
        encode_with(&self.health, snapshot)
    }

    /// Encodes a cycle's snapshot with `stash_up` and the duration taken from
    /// that cycle rather than from whichever cycle finished last.
    ///
    /// Pull-mode scrapes run concurrently, so the shared gauges may already
    /// describe another request's cycle by the time this one renders.
    #[must_use]
    pub fn render_cycle(&self, report: CycleReport) -> String {
        let health = self.health.for_cycle(report.is_success(), report.elapsed);
        encode_with(&health, Arc::new(report.snapshot))
    }

    /// Returns the Content-Type header value for the rendered body.
    #[must_use]
    pub const fn content_type() -> &'static str {
        "application/openmetrics-text; version=1.0.0; charset=utf-8"
    }
}

fn encode_with(health: &ScrapeHealth, snapshot: Arc<Snapshot>) -> String {
    let mut registry = Registry::default();
    registry.register_collector(Box::new(SnapshotCollector { snapshot }));
    health.register(&mut registry);

    let mut buffer = String::new();
    if encode(&mut buffer, &registry).is_err() {
        tracing::error!("failed to encode prometheus metrics");
        return String::new();
    }
    buffer
}

/// The most recently completed snapshot, replaced wholesale on publish.
///
/// Readers get an `Arc` and never observe a half-written snapshot.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSlot {
    latest: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotSlot {
    /// Creates a slot holding an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        *self.latest.write() = Arc::new(snapshot);
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.latest.read())
    }
}
