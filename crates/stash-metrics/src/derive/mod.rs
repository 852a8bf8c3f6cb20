//! Stateless derivers that turn fetched records into metric families.
//!
//! Each deriver reads the same scene list and shares nothing with the others.

pub mod coverage;
pub mod library;
pub mod orgasm;
pub mod playtime;
pub mod tags;

pub use coverage::Coverage;
pub use library::library_families;
pub use orgasm::{expand_events, o_counter_family, o_event_family, OEvent};
pub use playtime::PlaytimeBuckets;
pub use tags::{rank_tags, tag_usage_family, TagUsage, TOP_TAG_LIMIT};

use crate::snapshot::Snapshot;
use crate::types::{LibraryStats, Scene};

/// Runs every deriver and assembles the content snapshot.
///
/// Family order is fixed: library totals, coverage, playtime, tags, o-counter,
/// o-events. Given identical input the result is identical.
#[must_use]
pub fn derive_snapshot(stats: &LibraryStats, scenes: &[Scene]) -> Snapshot {
    let mut snapshot = Snapshot::empty();
    snapshot.extend(library_families(stats));
    snapshot.extend(Coverage::from_scenes(scenes).into_families());
    snapshot.extend(PlaytimeBuckets::from_scenes(scenes).into_families());
    snapshot.push(tag_usage_family(&rank_tags(scenes, TOP_TAG_LIMIT)));
    snapshot.push(o_counter_family(scenes));
    snapshot.push(o_event_family(&expand_events(scenes)));
    snapshot
}
