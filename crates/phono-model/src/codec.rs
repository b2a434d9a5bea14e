use crate::bundle::Bundle;
use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::inventory::{GraphemeEntry, Inventory};
use crate::registry::{AffixPosition, ValueRegistry};
use crate::resolver::Resolver;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// A grapheme string together with how it was obtained
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rendering {
    /// The bundle has an inventory entry of its own
    Exact(String),
    /// Base grapheme plus diacritics
    Composed(String),
    /// Base grapheme followed by the residual value names, `base[v1,v2]`
    Bracketed(String),
}

impl Rendering {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(s) | Self::Composed(s) | Self::Bracketed(s) => s,
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Exact(s) | Self::Composed(s) | Self::Bracketed(s) => s,
        }
    }

    #[must_use]
    pub const fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }

    /// True for the bracket fallback
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Bracketed(_))
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts between bundles and grapheme strings
pub(crate) struct Codec<'a> {
    registry: &'a ValueRegistry,
    inventory: &'a Inventory,
    config: &'a ModelConfig,
}

impl<'a> Codec<'a> {
    pub(crate) const fn new(
        registry: &'a ValueRegistry,
        inventory: &'a Inventory,
        config: &'a ModelConfig,
    ) -> Self {
        Self {
            registry,
            inventory,
            config,
        }
    }

    fn resolver(&self) -> Resolver<'a> {
        Resolver::new(self.registry, self.config)
    }

    pub(crate) fn render(&self, bundle: &Bundle) -> Result<Rendering> {
        if let Some(entry) = self.inventory.by_bundle(bundle) {
            return Ok(Rendering::Exact(entry.grapheme.clone()));
        }

        let empty = Bundle::new();
        let (base, base_bundle) = self
            .best_base(bundle)
            .map_or(("", &empty), |entry| (entry.grapheme.as_str(), &entry.bundle));
        let residual = self
            .registry
            .sort_values(bundle.difference(base_bundle), true)?;

        if residual.iter().all(|value| value.has_affix()) {
            let mut text = base.to_string();
            for value in &residual {
                if let Some(suffix) = &value.suffix {
                    text.push_str(suffix);
                } else if let Some(prefix) = &value.prefix {
                    text.insert_str(0, prefix);
                }
            }
            let text = self.config.normalization.apply(&text);
            match self.decode(&text) {
                Ok(decoded) if decoded == *bundle => return Ok(Rendering::Composed(text)),
                _ => log::warn!("composed grapheme `{text}` does not decode back, using bracket form"),
            }
        } else {
            log::debug!("residual of `{base}` has values without diacritics");
        }

        let names: Vec<&str> = residual.iter().map(|v| v.name.as_str()).collect();
        Ok(Rendering::Bracketed(format!("{base}[{}]", names.join(","))))
    }

    /// Entry sharing the most values with `bundle`.
    ///
    /// Each value of the entry that `bundle` lacks must belong to a feature
    /// `bundle` sets, so adding the residual replaces it.
    fn best_base(&self, bundle: &Bundle) -> Option<&'a GraphemeEntry> {
        let features: BTreeSet<String> = self.registry.feature_dict(bundle).into_keys().collect();
        let mut best: Option<(&GraphemeEntry, usize, usize)> = None;

        for entry in self.inventory.entries() {
            let shared = entry.bundle.shared(bundle);
            if shared == 0 {
                continue;
            }
            let mut extras = 0;
            let compatible = entry.bundle.difference(bundle).all(|name| {
                extras += 1;
                self.registry
                    .lookup(name)
                    .is_ok_and(|value| features.contains(&value.feature))
            });
            if !compatible {
                continue;
            }
            let better = best.map_or(true, |(_, best_shared, best_extras)| {
                shared > best_shared || (shared == best_shared && extras < best_extras)
            });
            if better {
                best = Some((entry, shared, extras));
            }
        }

        best.map(|(entry, _, _)| entry)
    }

    pub(crate) fn decode(&self, text: &str) -> Result<Bundle> {
        let text = self.config.normalization.apply(text);
        self.decode_normalized(&text)
    }

    fn decode_normalized(&self, text: &str) -> Result<Bundle> {
        if let Some(entry) = self.inventory.get(text) {
            return Ok(entry.bundle.clone());
        }
        if text.is_empty() {
            return Ok(Bundle::new());
        }
        if let Some((base, list)) = text.strip_suffix(']').and_then(|t| t.split_once('[')) {
            return self.decode_bracketed(base, list);
        }
        self.peel(text)
    }

    fn decode_bracketed(&self, base: &str, list: &str) -> Result<Bundle> {
        let base = self.decode_normalized(base)?;
        let mut additions = Vec::new();
        let mut removals = Vec::new();
        for item in list.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            match item.strip_prefix('-') {
                Some(name) => removals.push(name),
                None => additions.push(item.strip_prefix('+').unwrap_or(item)),
            }
        }
        self.resolver().resolve(&base, &additions, &removals)
    }

    /// Peel diacritics off both ends, one level at a time.
    ///
    /// The first level that leaves an entry (or nothing) wins, so the longest
    /// recognizable base is used.
    fn peel(&self, text: &str) -> Result<Bundle> {
        let resolver = self.resolver();
        let mut frontier: Vec<(&str, Vec<&str>)> = vec![(text, Vec::new())];
        let mut visited: HashSet<&str> = HashSet::from([text]);
        let mut failure: Option<ModelError> = None;
        let empty = Bundle::new();

        for _ in 0..self.config.max_affix_depth {
            let mut next = Vec::new();

            for (rest, peeled) in &frontier {
                for affix in self.registry.affixes() {
                    let remainder = match affix.position {
                        AffixPosition::Suffix => rest.strip_suffix(affix.text.as_str()),
                        AffixPosition::Prefix => rest.strip_prefix(affix.text.as_str()),
                    };
                    let Some(remainder) = remainder else { continue };
                    if self.repeats_feature(peeled, &affix.value) {
                        continue;
                    }

                    let mut values = peeled.clone();
                    values.push(affix.value.as_str());

                    let base = match self.inventory.get(remainder) {
                        Some(entry) => Some(&entry.bundle),
                        None if remainder.is_empty() => Some(&empty),
                        None => None,
                    };
                    if let Some(base) = base {
                        let additions: Vec<&str> = values.iter().rev().copied().collect();
                        match resolver.resolve(base, &additions, &[] as &[&str]) {
                            Ok(bundle) => return Ok(bundle),
                            Err(err) => {
                                log::debug!("`{text}` as `{remainder}` + {additions:?}: {err}");
                                failure.get_or_insert(err);
                            }
                        }
                    }

                    if visited.insert(remainder) {
                        next.push((remainder, values));
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Err(failure.unwrap_or_else(|| ModelError::unknown_grapheme(text)))
    }

    fn repeats_feature(&self, peeled: &[&str], value: &str) -> bool {
        let Ok(value) = self.registry.lookup(value) else {
            return true;
        };
        peeled.iter().any(|name| {
            self.registry
                .lookup(name)
                .is_ok_and(|other| other.feature == value.feature)
        })
    }
}
