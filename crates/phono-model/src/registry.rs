use crate::bundle::Bundle;
use crate::constraint::Constraint;
use crate::error::{ModelError, Result};
use crate::text::{is_valid_name, replace_codepoints, NormalizationForm};
use crate::types::FeatureRow;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A feature value with its rendering data and constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    pub name: String,
    pub feature: String,
    pub rank: u32,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub constraint: Constraint,
}

impl Value {
    #[must_use]
    pub const fn has_affix(&self) -> bool {
        self.prefix.is_some() || self.suffix.is_some()
    }

    /// Rank first, then name
    #[must_use]
    pub fn precedence(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// A named axis of mutually exclusive values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub name: String,
    /// Member values sorted by rank, then name
    pub values: Vec<String>,
}

/// Position of a diacritic relative to its base
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AffixPosition {
    Suffix,
    Prefix,
}

/// Diacritic string owned by a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affix {
    pub text: String,
    pub position: AffixPosition,
    pub value: String,
}

/// Every value of a model, keyed by name
#[derive(Debug, Clone)]
pub struct ValueRegistry {
    values: BTreeMap<String, Value>,
    features: BTreeMap<String, Feature>,
    /// Suffixes before prefixes, longest first
    affixes: Vec<Affix>,
}

impl ValueRegistry {
    /// Build and validate a registry from feature table rows
    pub fn load(rows: &[FeatureRow], normalization: NormalizationForm) -> Result<Self> {
        let mut values: BTreeMap<String, Value> = BTreeMap::new();
        let mut affix_owner: BTreeMap<String, String> = BTreeMap::new();
        let mut affixes = Vec::new();

        for (index, raw) in rows.iter().enumerate() {
            let row = index + 1;
            let feature = raw.feature.trim();
            let name = raw.value.trim();

            if !is_valid_name(feature) {
                return Err(ModelError::InvalidName {
                    row,
                    kind: "feature",
                    name: feature.to_string(),
                });
            }
            if !is_valid_name(name) {
                return Err(ModelError::InvalidName {
                    row,
                    kind: "value",
                    name: name.to_string(),
                });
            }
            if let Some(previous) = values.get(name) {
                return Err(ModelError::DuplicateValue {
                    row,
                    value: name.to_string(),
                    feature: previous.feature.clone(),
                });
            }
            let rank = u32::try_from(raw.rank)
                .ok()
                .filter(|rank| *rank >= 1)
                .ok_or_else(|| ModelError::InvalidRank {
                    row,
                    value: name.to_string(),
                    rank: raw.rank,
                })?;

            let text = raw.constraint.as_deref().unwrap_or_default();
            let constraint = Constraint::parse(text)
                .map_err(|reason| ModelError::malformed(format!("{name} (row {row})"), text, reason))?;

            let prefix = Self::affix_text(&raw.prefix, normalization);
            let suffix = Self::affix_text(&raw.suffix, normalization);
            for (text, position) in [
                (&prefix, AffixPosition::Prefix),
                (&suffix, AffixPosition::Suffix),
            ] {
                let Some(text) = text else { continue };
                if let Some(previous) = affix_owner.insert(text.clone(), name.to_string()) {
                    return Err(ModelError::DuplicateAffix {
                        affix: text.clone(),
                        value: name.to_string(),
                        previous,
                    });
                }
                affixes.push(Affix {
                    text: text.clone(),
                    position,
                    value: name.to_string(),
                });
            }

            values.insert(
                name.to_string(),
                Value {
                    name: name.to_string(),
                    feature: feature.to_string(),
                    rank,
                    prefix,
                    suffix,
                    constraint,
                },
            );
        }

        // Constraints may only mention values defined somewhere in the table
        for value in values.values() {
            if let Some(missing) = value.constraint.names().find(|n| !values.contains_key(*n)) {
                return Err(ModelError::malformed(
                    value.name.clone(),
                    missing,
                    format!("undefined value `{missing}`"),
                ));
            }
        }

        let mut members: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
        for value in values.values() {
            members.entry(value.feature.clone()).or_default().push(value);
        }
        let features = members
            .into_iter()
            .map(|(name, mut vals)| {
                vals.sort_by(|a, b| a.precedence(b));
                let values = vals.into_iter().map(|v| v.name.clone()).collect();
                (name.clone(), Feature { name, values })
            })
            .collect();

        affixes.sort_by(|a: &Affix, b: &Affix| {
            a.position
                .cmp(&b.position)
                .then_with(|| b.text.chars().count().cmp(&a.text.chars().count()))
                .then_with(|| a.text.cmp(&b.text))
        });

        Ok(Self {
            values,
            features,
            affixes,
        })
    }

    fn affix_text(raw: &str, normalization: NormalizationForm) -> Option<String> {
        let text = normalization.apply(&replace_codepoints(raw));
        (!text.is_empty()).then_some(text)
    }

    pub fn lookup(&self, name: &str) -> Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| ModelError::unknown_value(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn feature_of(&self, value: &str) -> Result<&Feature> {
        let value = self.lookup(value)?;
        self.feature(&value.feature)
    }

    pub fn feature(&self, name: &str) -> Result<&Feature> {
        self.features
            .get(name)
            .ok_or_else(|| ModelError::UnknownFeature(name.to_string()))
    }

    /// Values of a feature, sorted by rank then name
    pub fn values_of(&self, feature: &str) -> Result<&[String]> {
        self.feature(feature).map(|f| f.values.as_slice())
    }

    /// Features in name order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Values in name order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Diacritics ordered for matching: suffixes first, longer before shorter
    #[must_use]
    pub fn affixes(&self) -> &[Affix] {
        &self.affixes
    }

    /// Sort names by rank then name, or alphabetically when `use_rank` is false.
    ///
    /// Unknown names are reported rather than skipped.
    pub fn sort_values<'a, I>(&self, names: I, use_rank: bool) -> Result<Vec<&Value>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sorted = names
            .into_iter()
            .map(|name| self.lookup(name))
            .collect::<Result<Vec<_>>>()?;
        if use_rank {
            sorted.sort_by(|a, b| a.precedence(b));
        } else {
            sorted.sort_by(|a, b| a.name.cmp(&b.name));
        }
        sorted.dedup_by(|a, b| a.name == b.name);
        Ok(sorted)
    }

    /// The member of `bundle` belonging to `feature`, if any
    #[must_use]
    pub fn value_for<'b>(&self, bundle: &'b Bundle, feature: &str) -> Option<&'b str> {
        bundle
            .iter()
            .find(|name| self.values.get(*name).is_some_and(|v| v.feature == feature))
    }

    /// Feature → value map of a bundle
    #[must_use]
    pub fn feature_dict(&self, bundle: &Bundle) -> BTreeMap<String, String> {
        bundle
            .iter()
            .filter_map(|name| {
                self.values
                    .get(name)
                    .map(|v| (v.feature.clone(), name.to_string()))
            })
            .collect()
    }

    /// Space-joined names, rank then name
    #[must_use]
    pub fn describe(&self, bundle: &Bundle) -> String {
        let mut known: Vec<&Value> = bundle.iter().filter_map(|n| self.values.get(n)).collect();
        known.sort_by(|a, b| a.precedence(b));
        known
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
