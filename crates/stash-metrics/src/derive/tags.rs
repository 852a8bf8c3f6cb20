//! Tag popularity among played scenes, capped to bound label cardinality.

use std::collections::HashMap;

use crate::snapshot::MetricFamily;
use crate::types::Scene;

/// Maximum number of tag rows exported per cycle.
pub const TOP_TAG_LIMIT: usize = 100;

/// Metric name for tag usage.
pub const TAG_USAGE_METRIC: &str = "stash_tag_usage_count";

/// A tag and the number of played scenes carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUsage {
    /// Tag name.
    pub name: String,
    /// Number of played scenes with this tag.
    pub scenes: u64,
}

/// Ranks tags by the number of played scenes that carry them.
///
/// A scene contributes once per attached tag, regardless of how many times it
/// was played. Tags with empty names are ignored. The result is sorted by count
/// descending; ties keep first-seen order (scene order, then tag order within
/// the scene), which makes the cut at `limit` stable across identical inputs.
#[must_use]
pub fn rank_tags(scenes: &[Scene], limit: usize) -> Vec<TagUsage> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<TagUsage> = Vec::new();

    for scene in scenes.iter().filter(|scene| scene.play_count > 0) {
        for tag in scene.tags.iter().filter(|tag| !tag.name.is_empty()) {
            if let Some(&idx) = position.get(tag.name.as_str()) {
                ranked[idx].scenes += 1;
            } else {
                position.insert(tag.name.as_str(), ranked.len());
                ranked.push(TagUsage {
                    name: tag.name.clone(),
                    scenes: 1,
                });
            }
        }
    }

    // Stable sort: equal counts stay in first-seen order.
    ranked.sort_by(|a, b| b.scenes.cmp(&a.scenes));
    ranked.truncate(limit);
    ranked
}

/// Builds the tag usage family from a ranking.
#[must_use]
pub fn tag_usage_family(ranking: &[TagUsage]) -> MetricFamily {
    let mut family = MetricFamily::labeled(
        TAG_USAGE_METRIC,
        "Number of played scenes using each tag. Only top 100 tags by usage are exported.",
        &["tag_name"],
    );
    for usage in ranking {
        family.push([usage.name.as_str()], usage.scenes as f64);
    }
    family
}
