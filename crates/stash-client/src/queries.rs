//! GraphQL documents sent to Stash.
//!
//! Both queries ask only for what the derivers read. Validate them in the
//! Stash GraphQL playground when running against a customised schema.

/// Library-wide totals.
pub const LIBRARY_STATS_QUERY: &str = r"
query LibraryStats {
  stats {
    scene_count
    scenes_size
    scenes_duration

    image_count
    images_size

    gallery_count
    performer_count
    studio_count
    group_count
    tag_count

    total_o_count
    total_play_duration
    total_play_count
    scenes_played
  }
}
";

/// Every scene with coverage fields, play history and o history.
///
/// `per_page: -1` disables pagination.
pub const SCENE_PLAY_HISTORY_QUERY: &str = r"
query ScenePlayHistory {
  findScenes(filter: { per_page: -1 }) {
    scenes {
      id
      title
      organized
      stash_ids { endpoint stash_id }
      tags { name }
      performers { id }
      studio { id }
      scene_markers { id }

      play_count
      play_duration
      play_history

      o_counter
      o_history
    }
  }
}
";
