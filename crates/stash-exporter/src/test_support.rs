//! Fakes shared by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use stash_metrics::{FetchError, LibraryStats, Result, Scene, StashSource};

use crate::config::{ExportMode, ExporterConfig};
use crate::state::ExporterState;

/// In-memory Stash with switchable availability and an optional fetch delay.
#[derive(Default)]
pub struct FakeSource {
    scenes: Mutex<Option<Vec<Scene>>>,
    delay: Duration,
    cycles: AtomicUsize,
}

impl FakeSource {
    pub fn up(scenes: Vec<Scene>) -> Self {
        Self {
            scenes: Mutex::new(Some(scenes)),
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_scenes(&self, scenes: Option<Vec<Scene>>) {
        *self.scenes.lock() = scenes;
    }

    /// Number of stats fetches, one per cycle.
    pub fn cycles(&self) -> usize {
        self.cycles.load(Ordering::SeqCst)
    }
}

impl StashSource for FakeSource {
    async fn library_stats(&self) -> Result<LibraryStats> {
        self.cycles.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scene_count = self
            .scenes
            .lock()
            .as_ref()
            .map(Vec::len)
            .ok_or_else(|| FetchError::transport("connection refused"))?;
        Ok(LibraryStats {
            scene_count: scene_count as i64,
            ..LibraryStats::default()
        })
    }

    async fn scenes(&self) -> Result<Vec<Scene>> {
        self.scenes
            .lock()
            .clone()
            .ok_or_else(|| FetchError::transport("connection refused"))
    }
}

pub fn tagged_scene(id: &str, tag: &str) -> Scene {
    Scene::new(id)
        .with_plays(1, 60.0, ["2025-06-02T10:00:00Z"])
        .with_tags([tag])
}

pub fn make_state(mode: ExportMode, source: FakeSource) -> ExporterState<FakeSource> {
    let config = ExporterConfig::default()
        .with_mode(mode)
        .with_scrape_interval(Duration::from_secs(3600));
    ExporterState::new(config, source)
}
