//! Play time bucketed by day of week and hour of day.
//!
//! Stash only keeps a total play duration per scene plus one timestamp per
//! play, so the per-play duration is estimated by splitting the total evenly.
//! Every history entry of a scene receives the same estimate. This is an
//! approximation: nothing reconciles the redistributed time with the scene's
//! recorded total beyond that single division.

use chrono::{Datelike, Timelike};

use crate::snapshot::MetricFamily;
use crate::timestamp::parse_timestamp;
use crate::types::Scene;

/// Day-of-week label values, Monday first.
pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Number of hour-of-day buckets.
pub const HOURS_PER_DAY: usize = 24;

/// Metric name for the day-of-week buckets.
pub const BY_DAY_METRIC: &str = "stash_play_duration_seconds_by_dow";

/// Metric name for the hour-of-day buckets.
pub const BY_HOUR_METRIC: &str = "stash_play_duration_seconds_by_hour";

/// Seconds of play time per day of week and per hour of day.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaytimeBuckets {
    /// Indexed 0 = Monday .. 6 = Sunday.
    pub by_day: [f64; 7],
    /// Indexed by hour 0..=23, in the offset the timestamp was recorded with.
    pub by_hour: [f64; HOURS_PER_DAY],
}

impl Default for PlaytimeBuckets {
    fn default() -> Self {
        Self {
            by_day: [0.0; 7],
            by_hour: [0.0; HOURS_PER_DAY],
        }
    }
}

impl PlaytimeBuckets {
    /// Distributes every eligible scene's play time over its history.
    #[must_use]
    pub fn from_scenes(scenes: &[Scene]) -> Self {
        let mut buckets = Self::default();
        for scene in scenes {
            buckets.add_scene(scene);
        }
        buckets
    }

    fn add_scene(&mut self, scene: &Scene) {
        let Some(per_play) = per_play_estimate(scene) else {
            return;
        };

        for entry in &scene.play_history {
            let Some(instant) = parse_timestamp(entry) else {
                continue;
            };
            let day = instant.weekday().num_days_from_monday() as usize;
            let hour = instant.hour() as usize;
            self.by_day[day] += per_play;
            self.by_hour[hour] += per_play;
        }
    }

    /// Sum of all day buckets.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.by_day.iter().sum()
    }

    /// Converts the buckets into their two metric families.
    ///
    /// All 7 day rows and all 24 hour rows are emitted, zeros included.
    #[must_use]
    pub fn into_families(self) -> [MetricFamily; 2] {
        let mut by_day = MetricFamily::labeled(
            BY_DAY_METRIC,
            "Total play duration bucketed by day of week in seconds.",
            &["day_of_week"],
        );
        for (name, seconds) in DAY_NAMES.iter().zip(self.by_day) {
            by_day.push([*name], seconds);
        }

        let mut by_hour = MetricFamily::labeled(
            BY_HOUR_METRIC,
            "Total play duration bucketed by hour of day in seconds.",
            &["hour_of_day"],
        );
        for (hour, seconds) in self.by_hour.into_iter().enumerate() {
            by_hour.push([hour.to_string()], seconds);
        }

        [by_day, by_hour]
    }
}

/// Estimated seconds per play, or `None` when the scene carries no signal.
///
/// The divisor is the larger of the play count and the history length: the
/// two are maintained independently upstream and may disagree.
fn per_play_estimate(scene: &Scene) -> Option<f64> {
    if scene.play_count <= 0 || scene.play_duration <= 0.0 || scene.play_history.is_empty() {
        return None;
    }
    let divisor = scene.play_count.max(scene.play_history.len() as i64);
    Some(scene.play_duration / divisor as f64)
}
