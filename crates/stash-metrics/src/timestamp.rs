//! Timestamp normalization for Stash history entries.
//!
//! Stash records play and orgasm history as RFC 3339 strings, usually in UTC
//! with a `Z` suffix (`2025-12-12T20:07:59Z`). Parsing never fails loudly: an
//! entry that cannot be read yields `None` and the caller skips just that entry.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Naive layouts accepted when the string carries no offset. They are read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a history timestamp into an absolute instant.
///
/// A trailing `Z` is rewritten to `+00:00` before parsing; any other offset is
/// kept as given, so hour and weekday are read in the offset the upstream stated.
/// Strings without an offset are taken as UTC. Everything else yields `None`.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let normalized = match value.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => value.to_string(),
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(instant);
    }

    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(&normalized, format)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}
