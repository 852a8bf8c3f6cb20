//! Per-scene orgasm counters and the expanded event timeline.
//!
//! Two families coexist. The counter family carries each scene's current
//! `o_counter`. The timeline family emits one sample per recorded event whose
//! value is the event instant in milliseconds since the Unix epoch, meant for
//! plotting occurrences rather than for rate queries. The timeline is not capped.

use crate::snapshot::MetricFamily;
use crate::timestamp::parse_timestamp;
use crate::types::Scene;

/// Metric name for per-scene counters.
pub const O_COUNTER_METRIC: &str = "stash_scene_o_counter";

/// Metric name for the per-event timeline.
pub const O_EVENT_METRIC: &str = "stash_scene_o_event_timestamp_milliseconds";

/// One recorded event, positioned within its scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OEvent {
    /// Owning scene id.
    pub scene_id: String,
    /// Position among the scene's parseable events, oldest first.
    pub index: usize,
    /// Milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
}

/// Expands every scene's event history into indexed events.
///
/// Scenes without an id or without history are skipped. Unparseable entries
/// are dropped; the rest are sorted ascending and numbered from zero.
#[must_use]
pub fn expand_events(scenes: &[Scene]) -> Vec<OEvent> {
    let mut events = Vec::new();
    for scene in scenes {
        if scene.id.is_empty() || scene.o_history.is_empty() {
            continue;
        }

        let mut instants: Vec<i64> = scene
            .o_history
            .iter()
            .filter_map(|entry| parse_timestamp(entry))
            .map(|instant| instant.timestamp_millis())
            .collect();
        instants.sort_unstable();

        events.extend(
            instants
                .into_iter()
                .enumerate()
                .map(|(index, timestamp_millis)| OEvent {
                    scene_id: scene.id.clone(),
                    index,
                    timestamp_millis,
                }),
        );
    }
    events
}

/// Builds the timeline family.
#[must_use]
pub fn o_event_family(events: &[OEvent]) -> MetricFamily {
    let mut family = MetricFamily::labeled(
        O_EVENT_METRIC,
        "Timestamp of each recorded orgasm event per scene in milliseconds since the Unix epoch.",
        &["scene_id", "orgasm_index"],
    );
    for event in events {
        family.push(
            [event.scene_id.clone(), event.index.to_string()],
            event.timestamp_millis as f64,
        );
    }
    family
}

/// Builds the counter family from scenes with a positive `o_counter`.
#[must_use]
pub fn o_counter_family(scenes: &[Scene]) -> MetricFamily {
    let mut family = MetricFamily::labeled(
        O_COUNTER_METRIC,
        "Current orgasm counter value per scene (only scenes with o_counter > 0 are exported). \
         Use increase() in PromQL to calculate new events over time windows.",
        &["scene_id", "scene_name"],
    );
    for scene in scenes {
        if scene.id.is_empty() || scene.o_counter <= 0 {
            continue;
        }
        family.push([scene.id.as_str(), scene.display_name()], scene.o_counter as f64);
    }
    family
}
