use crate::bundle::Bundle;
use crate::error::{ModelError, Result};
use crate::registry::ValueRegistry;
use crate::text::{split_names, NormalizationForm};
use crate::types::GraphemeRow;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A canonical grapheme and the sound it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphemeEntry {
    pub grapheme: String,
    pub bundle: Bundle,
    pub is_class: bool,
    /// Auxiliary attributes, lowercase keys
    pub info: BTreeMap<String, String>,
}

/// All grapheme entries of a model, indexed both ways
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entries: BTreeMap<String, GraphemeEntry>,
    by_bundle: HashMap<Bundle, String>,
}

impl Inventory {
    /// Validate grapheme rows against the registry.
    ///
    /// Descriptions are checked strictly: every name must be a known value,
    /// no feature may be set twice and every constraint must already hold.
    pub fn load(
        rows: &[GraphemeRow],
        registry: &ValueRegistry,
        normalization: NormalizationForm,
    ) -> Result<Self> {
        let mut inventory = Self::default();

        for row in rows {
            let grapheme = normalization.apply(&row.grapheme);
            if grapheme.is_empty() || grapheme.contains(|c: char| c == '[' || c == ']') {
                return Err(ModelError::InvalidGrapheme(row.grapheme.clone()));
            }
            if inventory.entries.contains_key(&grapheme) {
                return Err(ModelError::DuplicateGrapheme(grapheme));
            }

            let bundle = parse_description(registry, &row.description)
                .map_err(|err| err.in_entry(grapheme.as_str()))?;

            if let Some(previous) = inventory.by_bundle.get(&bundle) {
                return Err(ModelError::DuplicateBundle {
                    grapheme,
                    previous: previous.clone(),
                });
            }

            inventory.by_bundle.insert(bundle.clone(), grapheme.clone());
            inventory.entries.insert(
                grapheme.clone(),
                GraphemeEntry {
                    grapheme,
                    bundle,
                    is_class: row.is_class,
                    info: row
                        .info
                        .iter()
                        .map(|(k, v)| (k.to_lowercase(), v.clone()))
                        .collect(),
                },
            );
        }

        Ok(inventory)
    }

    /// Entry for an already normalized grapheme
    #[must_use]
    pub fn get(&self, grapheme: &str) -> Option<&GraphemeEntry> {
        self.entries.get(grapheme)
    }

    /// Entry whose bundle equals `bundle` exactly
    #[must_use]
    pub fn by_bundle(&self, bundle: &Bundle) -> Option<&GraphemeEntry> {
        self.by_bundle
            .get(bundle)
            .and_then(|grapheme| self.entries.get(grapheme))
    }

    /// Entries in grapheme order
    pub fn entries(&self) -> impl Iterator<Item = &GraphemeEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turn a description into a bundle without resolving it.
///
/// Fails on unknown names, on two values of one feature and on any value
/// whose constraint the description does not satisfy.
pub(crate) fn parse_description(registry: &ValueRegistry, description: &str) -> Result<Bundle> {
    let mut bundle = Bundle::new();
    let mut by_feature: BTreeMap<&str, &str> = BTreeMap::new();

    for name in split_names(description) {
        let value = registry.lookup(name)?;
        if let Some(first) = by_feature.insert(value.feature.as_str(), value.name.as_str()) {
            if first != value.name {
                return Err(ModelError::FeatureConflict {
                    feature: value.feature.clone(),
                    first: first.to_string(),
                    second: value.name.clone(),
                });
            }
        }
        bundle.insert(value.name.clone());
    }

    for value in registry.sort_values(bundle.iter(), true)? {
        if !value.constraint.evaluate(&bundle) {
            return Err(ModelError::ConstraintViolation {
                value: value.name.clone(),
                bundle: registry.describe(&bundle),
            });
        }
    }

    Ok(bundle)
}
