use crate::bundle::Bundle;
use crate::codec::Rendering;
use crate::error::Result;
use crate::model::Model;
use std::collections::BTreeMap;
use std::fmt;

/// A bundle bound to the model it was built with.
///
/// Every operation returns a new sound; the original is left untouched.
#[derive(Clone)]
pub struct Sound<'m> {
    model: &'m Model,
    bundle: Bundle,
}

impl<'m> Sound<'m> {
    pub fn from_grapheme(model: &'m Model, grapheme: &str) -> Result<Self> {
        let bundle = model.decode(grapheme)?;
        Ok(Self { model, bundle })
    }

    pub fn from_description(model: &'m Model, description: &str) -> Result<Self> {
        let bundle = model.parse_description(description)?;
        Ok(Self { model, bundle })
    }

    #[must_use]
    pub const fn model(&self) -> &'m Model {
        self.model
    }

    #[must_use]
    pub const fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// Add values, replacing any value of the same feature
    pub fn with_additions<S: AsRef<str>>(&self, values: &[S]) -> Result<Self> {
        self.derive(values, &[] as &[&str])
    }

    pub fn with_removals<S: AsRef<str>>(&self, values: &[S]) -> Result<Self> {
        self.derive(&[] as &[&str], values)
    }

    /// Apply an edit such as `"+voiced -aspirated"`; removals go first
    pub fn edit(&self, changes: &str) -> Result<Self> {
        let mut additions = Vec::new();
        let mut removals = Vec::new();
        for token in changes
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            match token.strip_prefix('-') {
                Some(name) => removals.push(name),
                None => additions.push(token.strip_prefix('+').unwrap_or(token)),
            }
        }
        self.derive(additions.as_slice(), removals.as_slice())
    }

    fn derive<A: AsRef<str>, R: AsRef<str>>(&self, additions: &[A], removals: &[R]) -> Result<Self> {
        let bundle = self.model.resolve(&self.bundle, additions, removals)?;
        Ok(Self {
            model: self.model,
            bundle,
        })
    }

    pub fn grapheme(&self) -> Result<String> {
        self.model.encode(&self.bundle)
    }

    pub fn rendering(&self) -> Result<Rendering> {
        self.model.render(&self.bundle)
    }

    /// Value names, rank then name
    #[must_use]
    pub fn description(&self) -> String {
        self.model.describe(&self.bundle)
    }

    /// Active value of a feature, `None` when unset
    pub fn feature(&self, name: &str) -> Result<Option<&str>> {
        self.model.registry().feature(name)?;
        Ok(self.model.registry().value_for(&self.bundle, name))
    }

    #[must_use]
    pub fn feature_dict(&self) -> BTreeMap<String, String> {
        self.model.feature_dict(&self.bundle)
    }

    /// True if both sounds share a model and every value of `self` is in `other`
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model) && self.bundle.is_subset(&other.bundle)
    }

    #[must_use]
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.is_subset_of(self)
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        self.model.is_class(&self.bundle)
    }
}

impl PartialEq for Sound<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model) && self.bundle == other.bundle
    }
}

impl Eq for Sound<'_> {}

impl fmt::Debug for Sound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sound")
            .field("model", &self.model.name())
            .field("bundle", &self.bundle)
            .finish()
    }
}

impl fmt::Display for Sound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.model.render(&self.bundle) {
            Ok(rendering) => f.write_str(rendering.as_str()),
            Err(_) => write!(f, "[{}]", self.description()),
        }
    }
}
