//! Library metrics derivation for the Stash Prometheus exporter.
#![forbid(unsafe_code)]
//!
//! `stash-metrics` turns the records a Stash server reports about its library
//! into Prometheus metrics. It owns the record model, the derivers and the
//! collection cycle; talking to Stash is left to a [`StashSource`].
//!
//! # Features
//!
//! - **Full replacement**: every cycle produces a fresh [`Snapshot`]; label values
//!   missing from the latest data vanish from the exposition
//! - **Lenient decoding**: malformed numbers read as zero, bad timestamps are skipped
//! - **Bounded tags**: only the 100 most used tags among played scenes are exported
//! - **Self health**: `stash_up`, scrape duration and attempt counters persist
//!   across cycles
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use stash_metrics::{derive_snapshot, Exposition, LibraryStats, Scene};
//!
//! let scenes = vec![
//!     Scene::new("1").with_plays(2, 100.0, ["2025-06-02T10:00:00Z", "2025-06-02T22:00:00Z"]),
//! ];
//! let snapshot = derive_snapshot(&LibraryStats::default(), &scenes);
//!
//! let body = Exposition::default().render(Arc::new(snapshot));
//! assert!(body.contains("stash_play_duration_seconds_by_dow"));
//! ```

#![doc(html_root_url = "https://docs.rs/stash-metrics/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod collector;
pub mod derive;
pub mod error;
pub mod prometheus;
pub mod snapshot;
pub mod timestamp;
pub mod types;

// Re-export main types at crate root
pub use collector::{CyclePhase, CycleReport, StashCollector, StashSource};
pub use derive::derive_snapshot;
pub use error::{FetchError, Result};
pub use prometheus::{Exposition, ScrapeHealth, ScrapeStatus, SnapshotSlot};
pub use snapshot::{MetricFamily, Sample, Snapshot};
pub use timestamp::parse_timestamp;
pub use types::{LibraryStats, Scene};
