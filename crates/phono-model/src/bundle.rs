use serde::Serialize;
use std::collections::BTreeSet;

/// An unordered set of feature values describing one sound.
///
/// Bundles are only built by a [`Model`](crate::Model), which guarantees that
/// no two members share a feature and that every member's constraint holds.
/// Every operation on a sound yields a new bundle; existing ones are never
/// changed through the public API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Bundle {
    values: BTreeSet<String>,
}

impl Bundle {
    /// The fully unspecified sound
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Member names in alphabetical order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.values.is_subset(&other.values)
    }

    /// Number of values present in both bundles
    #[must_use]
    pub fn shared(&self, other: &Self) -> usize {
        self.values.intersection(&other.values).count()
    }

    /// Values of `self` missing from `other`, alphabetically
    pub fn difference<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a str> {
        self.values.difference(&other.values).map(String::as_str)
    }

    pub(crate) fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: names.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn insert(&mut self, value: impl Into<String>) -> bool {
        self.values.insert(value.into())
    }

    pub(crate) fn remove(&mut self, value: &str) -> bool {
        self.values.remove(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_semantics() {
        let a = Bundle::from_names(["voiced", "bilabial", "plosive", "consonant"]);
        let b = Bundle::from_names(["consonant", "plosive", "bilabial", "voiced"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert!(a.contains("voiced"));
        assert!(!a.contains("voiceless"));
    }

    #[test]
    fn test_subset_and_difference() {
        let small = Bundle::from_names(["bilabial", "consonant"]);
        let large = Bundle::from_names(["voiced", "bilabial", "plosive", "consonant"]);
        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        assert_eq!(large.shared(&small), 2);
        let missing: Vec<_> = large.difference(&small).collect();
        assert_eq!(missing, vec!["plosive", "voiced"]);
    }

    #[test]
    fn test_empty_bundle() {
        let empty = Bundle::new();
        assert!(empty.is_empty());
        assert!(empty.is_subset(&Bundle::default()));
        assert_eq!(empty.iter().count(), 0);
    }
}
