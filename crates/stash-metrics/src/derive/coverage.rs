//! Metadata coverage counts over the scene population.

use crate::snapshot::MetricFamily;
use crate::types::Scene;

/// Eight independent counts. A scene may contribute to any subset of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Scenes marked as organized.
    pub organized: u64,
    /// Scenes with at least one stash-box cross-reference.
    pub with_stash_id: u64,
    /// Scenes with at least one tag.
    pub tagged: u64,
    /// Scenes with at least one performer.
    pub with_performers: u64,
    /// Scenes with a studio.
    pub with_studio: u64,
    /// Scenes played at least once.
    pub watched: u64,
    /// Scenes with at least one marker.
    pub with_markers: u64,
    /// Markers summed across all scenes.
    pub marker_total: u64,
}

impl Coverage {
    /// Counts coverage over the given scenes.
    #[must_use]
    pub fn from_scenes(scenes: &[Scene]) -> Self {
        scenes.iter().fold(Self::default(), |mut acc, scene| {
            acc.organized += u64::from(scene.organized);
            acc.with_stash_id += u64::from(!scene.stash_ids.is_empty());
            acc.tagged += u64::from(!scene.tags.is_empty());
            acc.with_performers += u64::from(!scene.performers.is_empty());
            acc.with_studio += u64::from(scene.studio.is_some());
            acc.watched += u64::from(scene.play_count > 0);
            acc.with_markers += u64::from(scene.marker_count > 0);
            acc.marker_total += scene.marker_count as u64;
            acc
        })
    }

    /// One unlabeled family per count.
    #[must_use]
    pub fn into_families(self) -> Vec<MetricFamily> {
        vec![
            MetricFamily::single(
                "stash_scenes_organized_total",
                "Total number of scenes marked as organized.",
                self.organized as f64,
            ),
            MetricFamily::single(
                "stash_scenes_with_stashid_total",
                "Total number of scenes that have at least one StashID entry.",
                self.with_stash_id as f64,
            ),
            MetricFamily::single(
                "stash_scenes_tagged_total",
                "Total number of scenes that have at least one tag.",
                self.tagged as f64,
            ),
            MetricFamily::single(
                "stash_scenes_with_performers_total",
                "Total number of scenes that have at least one performer.",
                self.with_performers as f64,
            ),
            MetricFamily::single(
                "stash_scenes_with_studio_total",
                "Total number of scenes that have an associated studio.",
                self.with_studio as f64,
            ),
            MetricFamily::single(
                "stash_scenes_watched_total",
                "Total number of scenes that have at least one play.",
                self.watched as f64,
            ),
            MetricFamily::single(
                "stash_scenes_with_markers_total",
                "Total number of scenes that have at least one scene marker.",
                self.with_markers as f64,
            ),
            MetricFamily::single(
                "stash_scene_markers_total",
                "Total number of scene markers across all scenes.",
                self.marker_total as f64,
            ),
        ]
    }
}
