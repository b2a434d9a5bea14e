use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a feature table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureRow {
    /// Feature name (e.g. "place")
    pub feature: String,

    /// Value name, unique across the model (e.g. "bilabial")
    pub value: String,

    /// Rendering precedence (lower = first)
    pub rank: i64,

    /// Diacritic placed before the base, literal or `U+XXXX`
    #[serde(default)]
    pub prefix: String,

    /// Diacritic placed after the base, literal or `U+XXXX`
    #[serde(default)]
    pub suffix: String,

    /// Constraint expression, if any
    #[serde(default)]
    pub constraint: Option<String>,
}

impl FeatureRow {
    /// Create a row without affixes or constraint
    pub fn new(feature: impl Into<String>, value: impl Into<String>, rank: i64) -> Self {
        Self {
            feature: feature.into(),
            value: value.into(),
            rank,
            prefix: String::new(),
            suffix: String::new(),
            constraint: None,
        }
    }

    /// Builder: set prefix
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Builder: set suffix
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Builder: set constraint
    #[must_use]
    pub fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }
}

/// One row of a grapheme table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphemeRow {
    /// Grapheme string (normalized at load)
    pub grapheme: String,

    /// Value names, space or comma delimited
    pub description: String,

    /// Whether the grapheme stands for a class of sounds
    #[serde(default)]
    pub is_class: bool,

    /// Opaque per-grapheme attributes (e.g. prosody, sound class)
    #[serde(default)]
    pub info: BTreeMap<String, String>,
}

impl GraphemeRow {
    /// Create a row for a (non-class) grapheme
    pub fn new(grapheme: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            grapheme: grapheme.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Builder: mark as class grapheme
    #[must_use]
    pub const fn class(mut self) -> Self {
        self.is_class = true;
        self
    }

    /// Builder: add auxiliary attribute (key is lowercased)
    #[must_use]
    pub fn info(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.info
            .insert(key.as_ref().to_lowercase(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_row_builder() {
        let row = FeatureRow::new("aspiration", "aspirated", 9)
            .suffix("U+02B0")
            .constraint("consonant");
        assert_eq!(row.feature, "aspiration");
        assert_eq!(row.rank, 9);
        assert!(row.prefix.is_empty());
        assert_eq!(row.suffix, "U+02B0");
        assert_eq!(row.constraint.as_deref(), Some("consonant"));
    }

    #[test]
    fn test_grapheme_row_builder() {
        let row = GraphemeRow::new("C", "consonant")
            .class()
            .info("PROSODY", "1");
        assert!(row.is_class);
        assert_eq!(row.info.get("prosody").map(String::as_str), Some("1"));
    }
}
