//! Integration tests for full collection cycles rendered through the exposition.

use std::sync::Arc;

use parking_lot::Mutex;
use stash_metrics::{
    Exposition, FetchError, LibraryStats, Result, Scene, ScrapeHealth, ScrapeStatus,
    SnapshotSlot, StashCollector, StashSource,
};

// ==================== Helper Types ====================

/// Source whose responses can be swapped between cycles.
#[derive(Default)]
struct ScriptedSource {
    response: Mutex<Option<(LibraryStats, Vec<Scene>)>>,
}

impl ScriptedSource {
    fn serve(&self, stats: LibraryStats, scenes: Vec<Scene>) {
        *self.response.lock() = Some((stats, scenes));
    }

    fn go_down(&self) {
        *self.response.lock() = None;
    }
}

impl StashSource for ScriptedSource {
    async fn library_stats(&self) -> Result<LibraryStats> {
        self.response
            .lock()
            .as_ref()
            .map(|(stats, _)| stats.clone())
            .ok_or_else(|| FetchError::transport("connection refused"))
    }

    async fn scenes(&self) -> Result<Vec<Scene>> {
        self.response
            .lock()
            .as_ref()
            .map(|(_, scenes)| scenes.clone())
            .ok_or_else(|| FetchError::transport("connection refused"))
    }
}

// ==================== Helper Functions ====================

fn library() -> (LibraryStats, Vec<Scene>) {
    let stats = LibraryStats {
        scene_count: 3,
        image_count: 5,
        ..LibraryStats::default()
    };
    let scenes = vec![
        Scene::new("10")
            .with_title("Beach")
            .with_plays(2, 100.0, ["2025-06-02T10:00:00Z", "2025-06-02T22:00:00Z"])
            .with_tags(["outdoor", "hd"])
            .with_o_history(2, ["2025-01-01T00:00:01Z", "2025-01-01T00:00:00Z"]),
        Scene::new("11")
            .with_plays(1, 20.0, ["2025-06-03T08:00:00Z"])
            .with_tags(["hd"]),
        Scene::new("12").with_tags(["unwatched"]),
    ];
    (stats, scenes)
}

fn new_collector() -> StashCollector<ScriptedSource> {
    StashCollector::new(ScriptedSource::default(), ScrapeHealth::new())
}

// ==================== Success Tests ====================

#[tokio::test]
async fn test_successful_cycle_renders_all_families() {
    let collector = new_collector();
    let (stats, scenes) = library();
    collector.source().serve(stats, scenes);

    let report = collector.collect().await;
    let body = Exposition::new(collector.health().clone()).render(Arc::new(report.snapshot));

    for name in [
        "stash_scenes_total",
        "stash_files_total",
        "stash_scenes_watched_total",
        "stash_play_duration_seconds_by_dow",
        "stash_play_duration_seconds_by_hour",
        "stash_tag_usage_count",
        "stash_scene_o_counter",
        "stash_scene_o_event_timestamp_milliseconds",
        "stash_up",
        "stash_scrape_duration_seconds",
        "stash_scrapes_total",
    ] {
        assert!(body.contains(name), "missing {name}");
    }
    assert!(body.contains("stash_up 1"));
    assert!(body.contains("tag_name=\"hd\""));
    assert!(!body.contains("tag_name=\"unwatched\""));
}

#[tokio::test]
async fn test_playtime_example() {
    let collector = new_collector();
    let (stats, scenes) = library();
    collector.source().serve(stats, scenes);

    let report = collector.collect().await;

    let by_day = report
        .snapshot
        .family("stash_play_duration_seconds_by_dow")
        .unwrap();
    assert_eq!(by_day.value_of(&["Mon"]), Some(100.0));
    assert_eq!(by_day.value_of(&["Tue"]), Some(20.0));

    let by_hour = report
        .snapshot
        .family("stash_play_duration_seconds_by_hour")
        .unwrap();
    assert_eq!(by_hour.value_of(&["10"]), Some(50.0));
    assert_eq!(by_hour.value_of(&["22"]), Some(50.0));
    assert_eq!(by_hour.value_of(&["8"]), Some(20.0));
}

#[tokio::test]
async fn test_events_sorted_not_input_order() {
    let collector = new_collector();
    let (stats, scenes) = library();
    collector.source().serve(stats, scenes);

    let report = collector.collect().await;

    let events = report
        .snapshot
        .family("stash_scene_o_event_timestamp_milliseconds")
        .unwrap();
    assert_eq!(events.value_of(&["10", "0"]), Some(1_735_689_600_000.0));
    assert_eq!(events.value_of(&["10", "1"]), Some(1_735_689_601_000.0));
}

#[tokio::test]
async fn test_identical_input_gives_identical_snapshot() {
    let collector = new_collector();
    let (stats, scenes) = library();
    collector.source().serve(stats, scenes);

    let first = collector.collect().await;
    let second = collector.collect().await;

    assert_eq!(first.snapshot, second.snapshot);
}

// ==================== Failure Tests ====================

#[tokio::test]
async fn test_failure_exposes_only_health() {
    let collector = new_collector();

    let report = collector.collect().await;
    let body = Exposition::new(collector.health().clone()).render(Arc::new(report.snapshot));

    assert!(report.error.is_some());
    assert!(body.contains("stash_up 0"));
    assert!(body.contains("stash_scrape_duration_seconds"));
    assert!(body.contains("stash_scrapes_total{status=\"failure\"} 1"));
    assert!(!body.contains("stash_scenes_total"));
    assert!(!body.contains("stash_tag_usage_count"));
}

#[tokio::test]
async fn test_attempts_counter_accumulates_across_outcomes() {
    let collector = new_collector();
    let (stats, scenes) = library();

    collector.source().serve(stats, scenes);
    collector.collect().await;
    collector.collect().await;
    collector.source().go_down();
    collector.collect().await;

    assert_eq!(collector.health().scrapes(ScrapeStatus::Success), 2);
    assert_eq!(collector.health().scrapes(ScrapeStatus::Failure), 1);
    assert!(!collector.health().is_up());
}

// ==================== Replacement Tests ====================

#[tokio::test]
async fn test_stale_tags_vanish_between_cycles() {
    let collector = new_collector();
    let slot = SnapshotSlot::new();
    let exposition = Exposition::new(collector.health().clone());

    let (stats, scenes) = library();
    collector.source().serve(stats.clone(), scenes);
    slot.publish(collector.collect().await.snapshot);
    assert!(exposition.render(slot.latest()).contains("tag_name=\"outdoor\""));

    let retagged = vec![Scene::new("10")
        .with_plays(1, 10.0, ["2025-06-02T10:00:00Z"])
        .with_tags(["indoor"])];
    collector.source().serve(stats, retagged);
    slot.publish(collector.collect().await.snapshot);

    let body = exposition.render(slot.latest());
    assert!(!body.contains("tag_name=\"outdoor\""));
    assert!(body.contains("tag_name=\"indoor\""));
}

#[tokio::test]
async fn test_failed_cycle_clears_published_content() {
    let collector = new_collector();
    let slot = SnapshotSlot::new();
    let (stats, scenes) = library();

    collector.source().serve(stats, scenes);
    slot.publish(collector.collect().await.snapshot);
    assert!(!slot.latest().is_empty());

    collector.source().go_down();
    slot.publish(collector.collect().await.snapshot);
    assert!(slot.latest().is_empty());
}
