use crate::bundle::Bundle;
use crate::config::{ConstraintPolicy, ModelConfig};
use crate::error::{ModelError, Result};
use crate::registry::{Value, ValueRegistry};
use std::collections::BTreeSet;

/// Applies additions, removals and constraint closure to bundles
pub struct Resolver<'a> {
    registry: &'a ValueRegistry,
    policy: ConstraintPolicy,
    complete_implied: bool,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub const fn new(registry: &'a ValueRegistry, config: &ModelConfig) -> Self {
        Self {
            registry,
            policy: config.policy,
            complete_implied: config.complete_implied,
        }
    }

    /// Produce a new closed bundle from `existing`.
    ///
    /// Removals are applied first, then additions in the given order; an
    /// addition evicts any value of the same feature.
    pub fn resolve<A, R>(&self, existing: &Bundle, additions: &[A], removals: &[R]) -> Result<Bundle>
    where
        A: AsRef<str>,
        R: AsRef<str>,
    {
        let mut bundle = existing.clone();

        for name in removals {
            let value = self.registry.lookup(name.as_ref())?;
            bundle.remove(&value.name);
        }

        for name in additions {
            let value = self.registry.lookup(name.as_ref())?;
            if let Some(previous) = self.registry.value_for(&bundle, &value.feature) {
                let previous = previous.to_string();
                bundle.remove(&previous);
            }
            bundle.insert(value.name.clone());
        }

        self.close(bundle)
    }

    /// Run the constraint pass until no value changes
    pub fn close(&self, mut bundle: Bundle) -> Result<Bundle> {
        let mut dropped: BTreeSet<String> = BTreeSet::new();

        loop {
            let mut changed = false;
            let members: Vec<String> = self
                .registry
                .sort_values(bundle.iter(), true)?
                .into_iter()
                .map(|v| v.name.clone())
                .collect();

            for name in &members {
                if !bundle.contains(name) {
                    continue;
                }
                let value = self.registry.lookup(name)?;
                if value.constraint.evaluate(&bundle) {
                    continue;
                }

                if self.complete_implied {
                    if let Some(implied) = self.implied_values(value, &bundle, &dropped) {
                        log::debug!("`{name}` implies [{}]", implied.join(", "));
                        for implied in implied {
                            bundle.insert(implied);
                        }
                        changed = true;
                        continue;
                    }
                }

                match self.policy {
                    ConstraintPolicy::Reject => {
                        return Err(ModelError::ConstraintViolation {
                            value: name.clone(),
                            bundle: self.registry.describe(&bundle),
                        });
                    }
                    ConstraintPolicy::Drop => {
                        log::debug!("dropping `{name}`: constraint unsatisfied");
                        bundle.remove(name);
                        dropped.insert(name.clone());
                        changed = true;
                    }
                }
            }

            if !changed {
                return Ok(bundle);
            }
        }
    }

    /// First alternative that can be satisfied by adding values to free features
    fn implied_values(
        &self,
        value: &Value,
        bundle: &Bundle,
        dropped: &BTreeSet<String>,
    ) -> Option<Vec<String>> {
        value.constraint.alternatives().iter().find_map(|alt| {
            if alt.excluded().any(|name| bundle.contains(name)) {
                return None;
            }
            let mut features = BTreeSet::new();
            let mut missing = Vec::new();
            for name in alt.required().filter(|name| !bundle.contains(name)) {
                let required = self.registry.lookup(name).ok()?;
                let occupied = self.registry.value_for(bundle, &required.feature).is_some();
                if occupied || dropped.contains(name) || !features.insert(required.feature.as_str())
                {
                    return None;
                }
                missing.push(name.to_string());
            }
            (!missing.is_empty()).then_some(missing)
        })
    }
}
