//! The per-cycle snapshot model.
//!
//! A [`Snapshot`] is everything one collection cycle derived from the library,
//! held as an ordered list of [`MetricFamily`] values. It is built from scratch
//! every cycle and replaces the previous one wholesale, so a label value that
//! disappears from the source data disappears from the exposition with it.

use std::fmt;

/// A named gauge family with fixed help text and fixed label keys.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    /// Metric name as exposed.
    pub name: &'static str,
    /// Help text as exposed.
    pub help: &'static str,
    /// Label keys, in exposition order. Empty for unlabeled metrics.
    pub label_keys: &'static [&'static str],
    /// Samples in exposition order.
    pub samples: Vec<Sample>,
}

/// One observation within a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Label values, positionally matching the family's label keys.
    pub label_values: Vec<String>,
    /// Observed value.
    pub value: f64,
}

impl MetricFamily {
    /// Creates an empty labeled family.
    #[must_use]
    pub const fn labeled(
        name: &'static str,
        help: &'static str,
        label_keys: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            label_keys,
            samples: Vec::new(),
        }
    }

    /// Creates an unlabeled family holding a single value.
    #[must_use]
    pub fn single(name: &'static str, help: &'static str, value: f64) -> Self {
        Self {
            name,
            help,
            label_keys: &[],
            samples: vec![Sample {
                label_values: Vec::new(),
                value,
            }],
        }
    }

    /// Appends a sample. `label_values` must line up with the label keys.
    pub fn push<I, S>(&mut self, label_values: I, value: f64)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label_values: Vec<String> = label_values.into_iter().map(Into::into).collect();
        debug_assert_eq!(label_values.len(), self.label_keys.len());
        self.samples.push(Sample {
            label_values,
            value,
        });
    }

    /// Returns `true` when the family carries labels.
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        !self.label_keys.is_empty()
    }

    /// Looks up a sample value by its label values.
    #[must_use]
    pub fn value_of(&self, label_values: &[&str]) -> Option<f64> {
        self.samples
            .iter()
            .find(|sample| {
                sample.label_values.len() == label_values.len()
                    && sample
                        .label_values
                        .iter()
                        .zip(label_values)
                        .all(|(have, want)| have == want)
            })
            .map(|sample| sample.value)
    }

    /// Value of an unlabeled family.
    #[must_use]
    pub fn scalar(&self) -> Option<f64> {
        self.value_of(&[])
    }
}

/// All content-derived families produced by one collection cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    families: Vec<MetricFamily>,
}

impl Snapshot {
    /// Creates an empty snapshot. This is what a failed cycle publishes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a family.
    pub fn push(&mut self, family: MetricFamily) {
        self.families.push(family);
    }

    /// Appends several families.
    pub fn extend(&mut self, families: impl IntoIterator<Item = MetricFamily>) {
        self.families.extend(families);
    }

    /// Families in exposition order.
    #[must_use]
    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    /// Finds a family by name.
    #[must_use]
    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|family| family.name == name)
    }

    /// Returns `true` when the snapshot holds no families.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Total number of samples across all families.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.families.iter().map(|family| family.samples.len()).sum()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} families, {} samples",
            self.families.len(),
            self.sample_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_family_has_scalar_value() {
        let family = MetricFamily::single("stash_up", "help", 1.0);

        assert!(!family.is_labeled());
        assert_eq!(family.scalar(), Some(1.0));
    }

    #[test]
    fn labeled_family_lookup() {
        let mut family = MetricFamily::labeled("m", "help", &["a", "b"]);
        family.push(["x", "y"], 2.0);
        family.push(["x", "z"], 3.0);

        assert!(family.is_labeled());
        assert_eq!(family.value_of(&["x", "z"]), Some(3.0));
        assert_eq!(family.value_of(&["x"]), None);
        assert_eq!(family.value_of(&["q", "y"]), None);
    }

    #[test]
    fn snapshot_family_lookup_and_counts() {
        let mut snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());

        let mut labeled = MetricFamily::labeled("b", "help", &["k"]);
        labeled.push(["1"], 1.0);
        labeled.push(["2"], 2.0);
        snapshot.extend([MetricFamily::single("a", "help", 0.0), labeled]);

        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.families().len(), 2);
        assert_eq!(snapshot.sample_count(), 3);
        assert!(snapshot.family("b").is_some());
        assert!(snapshot.family("c").is_none());
        assert_eq!(snapshot.to_string(), "2 families, 3 samples");
    }
}
