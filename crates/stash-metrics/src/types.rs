//! Record types read from the Stash GraphQL API.
//!
//! This module provides the request-scoped views the derivers operate on:
//! - [`Scene`]: one library item with its play and engagement metadata
//! - [`LibraryStats`]: the flat totals returned by the `stats` query
//!
//! Every numeric field is decoded leniently. A value that is missing, `null`,
//! or not convertible becomes zero instead of failing the whole payload, so a
//! single odd record can never take the exporter down.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tag attached to a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag display name. Empty when the upstream omitted it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl Tag {
    /// Creates a tag with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A cross-reference to an external stash-box entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashId {
    /// The stash-box endpoint URL.
    #[serde(default, deserialize_with = "lenient_string")]
    pub endpoint: String,
    /// The identifier on that endpoint.
    #[serde(default, deserialize_with = "lenient_string")]
    pub stash_id: String,
}

/// A reference to another entity (performer, studio) by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
}

/// One library media item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene identifier. Empty when absent.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Optional display title.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    /// Whether the scene has been marked as organized.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub organized: bool,
    /// Cross-reference identifiers.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub stash_ids: Vec<StashId>,
    /// Attached tags.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<Tag>,
    /// Attached performers.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub performers: Vec<EntityRef>,
    /// Studio reference, if any. Any non-null value counts as present.
    #[serde(default, deserialize_with = "lenient_entity")]
    pub studio: Option<EntityRef>,
    /// Scene markers. Only their number matters here.
    #[serde(default, deserialize_with = "marker_count", rename = "scene_markers")]
    pub marker_count: usize,
    /// Number of recorded plays.
    #[serde(default, deserialize_with = "lenient_int")]
    pub play_count: i64,
    /// Total play time in seconds.
    #[serde(default, deserialize_with = "lenient_float")]
    pub play_duration: f64,
    /// One timestamp string per recorded play.
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub play_history: Vec<String>,
    /// Current orgasm counter.
    #[serde(default, deserialize_with = "lenient_int")]
    pub o_counter: i64,
    /// One timestamp string per recorded orgasm event.
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub o_history: Vec<String>,
}

impl Scene {
    /// Creates an otherwise empty scene with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the title and returns self for chaining.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Records plays and returns self for chaining.
    #[must_use]
    pub fn with_plays<I, S>(mut self, play_count: i64, play_duration: f64, history: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.play_count = play_count;
        self.play_duration = play_duration;
        self.play_history = history.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches tags by name and returns self for chaining.
    #[must_use]
    pub fn with_tags<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = names.into_iter().map(Tag::new).collect();
        self
    }

    /// Records orgasm events and returns self for chaining.
    #[must_use]
    pub fn with_o_history<I, S>(mut self, o_counter: i64, history: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.o_counter = o_counter;
        self.o_history = history.into_iter().map(Into::into).collect();
        self
    }

    /// Label used for the scene in per-scene series: the title, or the id
    /// when the title is empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.id,
        }
    }
}

/// Library-wide totals from the `stats` query.
///
/// Absent fields are unknown and read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    /// Number of scenes.
    #[serde(default, deserialize_with = "lenient_int")]
    pub scene_count: i64,
    /// Combined size of scene files in bytes.
    #[serde(default, deserialize_with = "lenient_int")]
    pub scenes_size: i64,
    /// Combined duration of all scenes in seconds.
    #[serde(default, deserialize_with = "lenient_int")]
    pub scenes_duration: i64,
    /// Number of images.
    #[serde(default, deserialize_with = "lenient_int")]
    pub image_count: i64,
    /// Combined size of image files in bytes.
    #[serde(default, deserialize_with = "lenient_int")]
    pub images_size: i64,
    /// Number of galleries.
    #[serde(default, deserialize_with = "lenient_int")]
    pub gallery_count: i64,
    /// Number of performers.
    #[serde(default, deserialize_with = "lenient_int")]
    pub performer_count: i64,
    /// Number of studios.
    #[serde(default, deserialize_with = "lenient_int")]
    pub studio_count: i64,
    /// Number of groups.
    #[serde(default, deserialize_with = "lenient_int")]
    pub group_count: i64,
    /// Number of tags.
    #[serde(default, deserialize_with = "lenient_int")]
    pub tag_count: i64,
    /// Sum of all scene orgasm counters.
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_o_count: i64,
    /// Total play duration across all scenes in seconds.
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_play_duration: i64,
    /// Total number of recorded plays.
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_play_count: i64,
    /// Number of scenes with at least one play.
    #[serde(default, deserialize_with = "lenient_int")]
    pub scenes_played: i64,
}

/// Coerces an arbitrary JSON value to an integer, zero when impossible.
///
/// Floats truncate toward zero; strings must hold a plain integer.
#[must_use]
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Coerces an arbitrary JSON value to a float, zero when impossible.
#[must_use]
pub fn coerce_float(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_int(&value))
}

fn lenient_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_float(&value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Decodes a list item by item. `null` or a non-array is empty; an item of the
/// wrong shape becomes `T::default()` so the list keeps its length.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| T::deserialize(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_entity<'de, D>(deserializer: D) -> Result<Option<EntityRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(EntityRef::deserialize(other).unwrap_or_default()),
    })
}

fn marker_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(markers) => markers.len(),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(5), 5 ; "integer")]
    #[test_case(json!(3.9), 3 ; "float truncates")]
    #[test_case(json!(-2.5), -2 ; "negative float truncates toward zero")]
    #[test_case(json!("42"), 42 ; "numeric string")]
    #[test_case(json!("4.2"), 0 ; "float string")]
    #[test_case(json!("abc"), 0 ; "garbage string")]
    #[test_case(json!(null), 0 ; "null")]
    #[test_case(json!([1, 2]), 0 ; "array")]
    fn coerce_int_cases(value: Value, expected: i64) {
        assert_eq!(coerce_int(&value), expected);
    }

    #[test_case(json!(12.5), 12.5 ; "float")]
    #[test_case(json!(7), 7.0 ; "integer")]
    #[test_case(json!("1.5"), 1.5 ; "numeric string")]
    #[test_case(json!("nope"), 0.0 ; "garbage string")]
    #[test_case(json!(null), 0.0 ; "null")]
    #[test_case(json!({"a": 1}), 0.0 ; "object")]
    fn coerce_float_cases(value: Value, expected: f64) {
        assert!((coerce_float(&value) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn scene_decodes_full_record() {
        let raw = json!({
            "id": "42",
            "title": "Example",
            "organized": true,
            "stash_ids": [{"endpoint": "https://stashdb.org/graphql", "stash_id": "abc"}],
            "tags": [{"name": "outdoor"}, {"name": "hd"}],
            "performers": [{"id": "7"}],
            "studio": {"id": "3"},
            "scene_markers": [{"id": "1"}, {"id": "2"}, {"id": "3"}],
            "play_count": 2,
            "play_duration": 100.5,
            "play_history": ["2025-06-02T10:00:00Z", "2025-06-02T22:00:00Z"],
            "o_counter": 1,
            "o_history": ["2025-06-02T10:05:00Z"]
        });

        let scene: Scene = serde_json::from_value(raw).unwrap();

        assert_eq!(scene.id, "42");
        assert_eq!(scene.display_name(), "Example");
        assert!(scene.organized);
        assert_eq!(scene.stash_ids.len(), 1);
        assert_eq!(scene.tags, vec![Tag::new("outdoor"), Tag::new("hd")]);
        assert_eq!(scene.performers.len(), 1);
        assert_eq!(scene.studio, Some(EntityRef { id: "3".into() }));
        assert_eq!(scene.marker_count, 3);
        assert_eq!(scene.play_count, 2);
        assert!((scene.play_duration - 100.5).abs() < f64::EPSILON);
        assert_eq!(scene.play_history.len(), 2);
        assert_eq!(scene.o_counter, 1);
        assert_eq!(scene.o_history.len(), 1);
    }

    #[test]
    fn scene_coerces_malformed_fields() {
        let raw = json!({
            "id": 17,
            "organized": "yes",
            "stash_ids": null,
            "tags": null,
            "performers": null,
            "studio": null,
            "scene_markers": null,
            "play_count": "not a number",
            "play_duration": null,
            "play_history": null,
            "o_counter": 2.7,
        });

        let scene: Scene = serde_json::from_value(raw).unwrap();

        assert_eq!(scene.id, "17");
        assert!(!scene.organized);
        assert!(scene.stash_ids.is_empty());
        assert!(scene.tags.is_empty());
        assert!(scene.performers.is_empty());
        assert!(scene.studio.is_none());
        assert_eq!(scene.marker_count, 0);
        assert_eq!(scene.play_count, 0);
        assert!(scene.play_duration.abs() < f64::EPSILON);
        assert!(scene.play_history.is_empty());
        assert_eq!(scene.o_counter, 2);
        assert!(scene.o_history.is_empty());
    }

    #[test]
    fn scene_decodes_empty_object() {
        let scene: Scene = serde_json::from_value(json!({})).unwrap();
        assert_eq!(scene, Scene::default());
    }

    #[test]
    fn tag_without_name_decodes_to_empty() {
        let scene: Scene = serde_json::from_value(json!({"tags": [{}, {"name": null}]})).unwrap();
        assert_eq!(scene.tags, vec![Tag::default(), Tag::default()]);
    }

    #[test]
    fn malformed_studio_still_counts_as_present() {
        let scene: Scene = serde_json::from_value(json!({"id": "1", "studio": "x"})).unwrap();
        assert_eq!(scene.studio, Some(EntityRef::default()));

        let scene: Scene = serde_json::from_value(json!({"studio": 5})).unwrap();
        assert!(scene.studio.is_some());
    }

    #[test]
    fn malformed_list_items_keep_their_slot() {
        let scene: Scene = serde_json::from_value(json!({
            "stash_ids": ["abc"],
            "performers": [7, {"id": "8"}],
            "tags": [{"name": "a"}, null],
        }))
        .unwrap();

        assert_eq!(scene.stash_ids, vec![StashId::default()]);
        assert_eq!(scene.performers, vec![EntityRef::default(), EntityRef { id: "8".into() }]);
        assert_eq!(scene.tags, vec![Tag::new("a"), Tag::default()]);
    }

    #[test]
    fn non_array_lists_are_empty() {
        let scene: Scene =
            serde_json::from_value(json!({"tags": "hd", "stash_ids": {"stash_id": "x"}})).unwrap();
        assert!(scene.tags.is_empty());
        assert!(scene.stash_ids.is_empty());
    }

    #[test]
    fn one_malformed_scene_does_not_spoil_the_list() {
        let scenes: Vec<Scene> = serde_json::from_value(json!([
            {"id": "1", "studio": "x", "stash_ids": ["abc"], "play_count": 1},
            {"id": "2", "tags": [{"name": "hd"}, null], "play_count": 1},
        ]))
        .unwrap();

        assert_eq!(scenes.len(), 2);
        assert!(scenes[0].studio.is_some());
        assert_eq!(scenes[1].tags[0], Tag::new("hd"));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(Scene::new("s1").display_name(), "s1");
        assert_eq!(Scene::new("s1").with_title("").display_name(), "s1");
        assert_eq!(Scene::new("s1").with_title("Title").display_name(), "Title");
    }

    #[test]
    fn library_stats_missing_fields_are_zero() {
        let stats: LibraryStats =
            serde_json::from_value(json!({"scene_count": 10, "scenes_size": 1.5e9})).unwrap();

        assert_eq!(stats.scene_count, 10);
        assert_eq!(stats.scenes_size, 1_500_000_000);
        assert_eq!(stats.image_count, 0);
        assert_eq!(stats.total_play_count, 0);
    }

    #[test]
    fn library_stats_null_fields_are_zero() {
        let stats: LibraryStats =
            serde_json::from_value(json!({"scene_count": null, "tag_count": "x"})).unwrap();
        assert_eq!(stats, LibraryStats::default());
    }
}
