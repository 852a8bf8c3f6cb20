//! Library-wide totals taken straight from the `stats` query.

use crate::snapshot::MetricFamily;
use crate::types::LibraryStats;

/// Converts library stats into unlabeled totals.
///
/// Every total is always emitted. File count and size are approximated by
/// adding scenes and images, since the upstream reports them per media type.
#[must_use]
pub fn library_families(stats: &LibraryStats) -> Vec<MetricFamily> {
    let totals: [(&'static str, &'static str, i64); 16] = [
        (
            "stash_scenes_total",
            "Total number of scenes in the Stash library.",
            stats.scene_count,
        ),
        (
            "stash_images_total",
            "Total number of images in the Stash library.",
            stats.image_count,
        ),
        (
            "stash_performers_total",
            "Total number of performers in the Stash library.",
            stats.performer_count,
        ),
        (
            "stash_studios_total",
            "Total number of studios in the Stash library.",
            stats.studio_count,
        ),
        (
            "stash_galleries_total",
            "Total number of galleries in the Stash library.",
            stats.gallery_count,
        ),
        (
            "stash_tags_total",
            "Total number of tags in the Stash library.",
            stats.tag_count,
        ),
        (
            "stash_groups_total",
            "Total number of groups in the Stash library.",
            stats.group_count,
        ),
        (
            "stash_files_total",
            "Total number of files tracked by Stash.",
            stats.scene_count.saturating_add(stats.image_count),
        ),
        (
            "stash_files_size_bytes",
            "Total size of all files tracked by Stash in bytes.",
            stats.scenes_size.saturating_add(stats.images_size),
        ),
        (
            "stash_scenes_size_bytes",
            "Total size of all scene files in bytes.",
            stats.scenes_size,
        ),
        (
            "stash_images_size_bytes",
            "Total size of all image files in bytes.",
            stats.images_size,
        ),
        (
            "stash_scenes_duration_seconds",
            "Total duration of all scenes in the Stash library in seconds.",
            stats.scenes_duration,
        ),
        (
            "stash_total_o_count",
            "Total orgasm counter across all scenes (Stash o_counter aggregate).",
            stats.total_o_count,
        ),
        (
            "stash_total_play_duration_seconds",
            "Total play duration across all scenes in seconds.",
            stats.total_play_duration,
        ),
        (
            "stash_total_play_count",
            "Total number of scene plays recorded in Stash.",
            stats.total_play_count,
        ),
        (
            "stash_scenes_played_total",
            "Total number of scenes that have at least one recorded play.",
            stats.scenes_played,
        ),
    ];

    totals
        .into_iter()
        .map(|(name, help, value)| MetricFamily::single(name, help, value as f64))
        .collect()
}
