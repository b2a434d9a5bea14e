use crate::bundle::Bundle;
use crate::constraint::Query;
use crate::error::{ModelError, Result};
use crate::inventory::GraphemeEntry;
use crate::model::Model;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Feature → value map keyed by the input grapheme
pub type FeatureMatrix = BTreeMap<String, BTreeMap<String, String>>;

/// A sound as a vector over the whole model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValueVector {
    /// One slot per `feature_value` name, true when present
    Binary {
        names: Vec<String>,
        values: Vec<bool>,
    },
    /// One slot per feature, holding the active value if any
    Categorical {
        names: Vec<String>,
        values: Vec<Option<String>>,
    },
}

impl ValueVector {
    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            Self::Binary { names, .. } | Self::Categorical { names, .. } => names,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

impl Model {
    /// Graphemes whose sound satisfies a query such as `+vowel +front -close`
    pub fn values_to_graphemes(&self, query: &str) -> Result<Vec<String>> {
        let parsed = Query::parse(query).map_err(|reason| ModelError::malformed("query", query, reason))?;
        for atom in parsed.atoms() {
            self.registry.lookup(&atom.value)?;
        }

        Ok(self
            .inventory
            .entries()
            .filter(|entry| self.config.queries_include_classes || !entry.is_class)
            .filter(|entry| parsed.matches(&entry.bundle))
            .map(|entry| entry.grapheme.clone())
            .collect())
    }

    /// Smallest feature set that tells all inputs apart.
    ///
    /// Among sets of equal size the one with the lexicographically smallest
    /// sorted feature names wins. Features a sound leaves unset are omitted
    /// from its row.
    pub fn minimal_matrix<S: AsRef<str>>(&self, graphemes: &[S]) -> Result<FeatureMatrix> {
        let sounds = self.decode_all(graphemes)?;

        let mut seen: HashMap<&Bundle, &str> = HashMap::new();
        for (grapheme, bundle) in &sounds {
            if let Some(first) = seen.insert(bundle, grapheme) {
                return Err(ModelError::AmbiguousInput {
                    first: first.to_string(),
                    second: grapheme.clone(),
                });
            }
        }

        let dicts: Vec<BTreeMap<String, String>> = sounds
            .iter()
            .map(|(_, bundle)| self.registry.feature_dict(bundle))
            .collect();
        let candidates: Vec<&str> = self
            .registry
            .features()
            .map(|f| f.name.as_str())
            .filter(|feature| {
                let mut projections = dicts.iter().map(|d| d.get(*feature));
                projections
                    .next()
                    .is_some_and(|first| projections.any(|other| other != first))
            })
            .collect();

        let chosen = (0..=candidates.len())
            .flat_map(|size| Combinations::new(candidates.len(), size))
            .map(|indices| indices.iter().map(|&i| candidates[i]).collect::<Vec<_>>())
            .find(|features| Self::distinguishes(&dicts, features))
            .unwrap_or_default();

        Ok(sounds
            .iter()
            .zip(&dicts)
            .map(|((grapheme, _), dict)| {
                let row = chosen
                    .iter()
                    .filter_map(|f| dict.get(*f).map(|v| ((*f).to_string(), v.clone())))
                    .collect();
                (grapheme.clone(), row)
            })
            .collect())
    }

    fn distinguishes(dicts: &[BTreeMap<String, String>], features: &[&str]) -> bool {
        let mut projections = HashSet::new();
        dicts.iter().all(|dict| {
            let projection: Vec<Option<&String>> = features.iter().map(|f| dict.get(*f)).collect();
            projections.insert(projection)
        })
    }

    /// Feature values shared by every input
    pub fn class_features<S: AsRef<str>>(&self, graphemes: &[S]) -> Result<BTreeMap<String, String>> {
        let sounds = self.decode_all(graphemes)?;
        let mut sounds = sounds.iter().map(|(_, bundle)| self.registry.feature_dict(bundle));
        let Some(mut shared) = sounds.next() else {
            return Ok(BTreeMap::new());
        };
        for dict in sounds {
            shared.retain(|feature, value| dict.get(feature) == Some(&*value));
        }
        Ok(shared)
    }

    /// Binary or categorical vector of a grapheme's sound
    pub fn value_vector(&self, grapheme: &str, binary: bool) -> Result<ValueVector> {
        let bundle = self.decode(grapheme)?;
        Ok(self.bundle_vector(&bundle, binary))
    }

    /// Vector of a bundle; names are sorted and cover the whole model
    #[must_use]
    pub fn bundle_vector(&self, bundle: &Bundle, binary: bool) -> ValueVector {
        if binary {
            let mut slots: Vec<(String, bool)> = self
                .registry
                .values()
                .map(|v| (format!("{}_{}", v.feature, v.name), bundle.contains(&v.name)))
                .collect();
            slots.sort();
            let (names, values) = slots.into_iter().unzip();
            ValueVector::Binary { names, values }
        } else {
            let (names, values) = self
                .registry
                .features()
                .map(|f| {
                    let value = self.registry.value_for(bundle, &f.name).map(str::to_string);
                    (f.name.clone(), value)
                })
                .unzip();
            ValueVector::Categorical { names, values }
        }
    }

    pub(crate) fn binary_values(&self, bundle: &Bundle) -> Vec<f64> {
        match self.bundle_vector(bundle, true) {
            ValueVector::Binary { values, .. } => values
                .into_iter()
                .map(|present| if present { 1.0 } else { 0.0 })
                .collect(),
            ValueVector::Categorical { .. } => Vec::new(),
        }
    }

    /// The grapheme closest to `bundle`.
    ///
    /// An exact entry wins. Otherwise each candidate scores the ranks of the
    /// values it shares minus the ranks of its extra values, so base-defining
    /// values (type, manner) weigh more than diacritic ones.
    #[must_use]
    pub fn closest_grapheme(&self, bundle: &Bundle, include_classes: bool) -> Option<&str> {
        self.closest_entry(bundle, include_classes)
            .map(|entry| entry.grapheme.as_str())
    }

    fn closest_entry(&self, bundle: &Bundle, include_classes: bool) -> Option<&GraphemeEntry> {
        if let Some(entry) = self.inventory.by_bundle(bundle) {
            if include_classes || !entry.is_class {
                return Some(entry);
            }
        }

        let mut best: Option<(&GraphemeEntry, f64)> = None;
        for entry in self.inventory.entries() {
            if entry.is_class && !include_classes {
                continue;
            }
            let shared = self.weight(bundle.iter().filter(|name| entry.bundle.contains(name)));
            let extra = self.weight(entry.bundle.difference(bundle));
            let score = shared - extra;
            if score > best.map_or(0.0, |(_, best)| best) {
                best = Some((entry, score));
            }
        }
        best.map(|(entry, _)| entry)
    }

    fn weight<'b>(&self, names: impl Iterator<Item = &'b str>) -> f64 {
        names
            .filter_map(|name| self.registry.lookup(name).ok())
            .map(|value| f64::from(value.rank))
            .sum()
    }

    /// Auxiliary attribute of a grapheme (case-insensitive field name).
    ///
    /// A sound without an entry of its own reports its closest entry's value.
    pub fn info(&self, grapheme: &str, field: &str) -> Result<Option<&str>> {
        let bundle = self.decode(grapheme)?;
        let field = field.to_lowercase();
        Ok(self
            .inventory
            .by_bundle(&bundle)
            .or_else(|| self.closest_entry(&bundle, false))
            .and_then(|entry| entry.info.get(&field))
            .map(String::as_str))
    }

    fn decode_all<S: AsRef<str>>(&self, graphemes: &[S]) -> Result<Vec<(String, Bundle)>> {
        graphemes
            .iter()
            .map(|g| {
                let grapheme = g.as_ref();
                self.decode(grapheme).map(|bundle| (grapheme.to_string(), bundle))
            })
            .collect()
    }
}

/// Index combinations of a given size, in lexicographic order
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}
