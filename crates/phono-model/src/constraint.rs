//! Presence/absence expressions over value names.
//!
//! A value constraint is a disjunction of conjunctions: alternatives are
//! separated by `|`, and each alternative lists atoms separated by whitespace
//! or commas. An atom is a value name that must be present (`name` or `+name`)
//! or absent (`-name` or `!name`). Query strings use the same atoms but are a
//! single conjunction.

use crate::bundle::Bundle;
use crate::text::is_valid_name;
use serde::Serialize;
use std::collections::BTreeSet;

/// One presence or absence requirement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Atom {
    pub value: String,
    pub present: bool,
}

impl Atom {
    fn parse(token: &str) -> Result<Self, String> {
        let (present, name) = match token.chars().next() {
            Some('+') => (true, &token[1..]),
            Some('-' | '!') => (false, &token[1..]),
            _ => (true, token),
        };
        if !is_valid_name(name) {
            return Err(format!("invalid value name `{name}`"));
        }
        Ok(Self {
            value: name.to_string(),
            present,
        })
    }

    #[must_use]
    pub fn holds(&self, bundle: &Bundle) -> bool {
        bundle.contains(&self.value) == self.present
    }
}

/// A list of atoms that must all hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Conjunction {
    atoms: Vec<Atom>,
}

impl Conjunction {
    fn parse(text: &str) -> Result<Self, String> {
        let mut atoms: Vec<Atom> = Vec::new();
        let mut seen = BTreeSet::new();
        for token in text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let atom = Atom::parse(token)?;
            if !seen.insert(atom.value.clone()) {
                let contradicts = atoms
                    .iter()
                    .any(|a| a.value == atom.value && a.present != atom.present);
                return Err(if contradicts {
                    format!("`{}` is required both present and absent", atom.value)
                } else {
                    format!("`{}` is listed twice", atom.value)
                });
            }
            atoms.push(atom);
        }
        if atoms.is_empty() {
            return Err("empty alternative".to_string());
        }
        Ok(Self { atoms })
    }

    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[must_use]
    pub fn holds(&self, bundle: &Bundle) -> bool {
        self.atoms.iter().all(|atom| atom.holds(bundle))
    }

    /// Names required present
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.atoms
            .iter()
            .filter(|a| a.present)
            .map(|a| a.value.as_str())
    }

    /// Names required absent
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.atoms
            .iter()
            .filter(|a| !a.present)
            .map(|a| a.value.as_str())
    }
}

/// A value-level constraint; the empty constraint always holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Constraint {
    alternatives: Vec<Conjunction>,
}

impl Constraint {
    /// Parse constraint text; empty or blank text yields the vacuous constraint
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let alternatives = text
            .split('|')
            .map(Conjunction::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    #[must_use]
    pub fn alternatives(&self) -> &[Conjunction] {
        &self.alternatives
    }

    /// True if any alternative is fully satisfied by `bundle`
    #[must_use]
    pub fn evaluate(&self, bundle: &Bundle) -> bool {
        self.alternatives.is_empty() || self.alternatives.iter().any(|alt| alt.holds(bundle))
    }

    /// Every value name mentioned, in any alternative
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.alternatives
            .iter()
            .flat_map(|alt| alt.atoms.iter().map(|a| a.value.as_str()))
    }
}

/// A query string such as `+vowel +front -close`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    conjunction: Conjunction,
}

impl Query {
    /// Parse a query; disjunctions are only allowed in value constraints
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.contains('|') {
            return Err("disjunctions are not allowed in queries".to_string());
        }
        Conjunction::parse(text).map(|conjunction| Self { conjunction })
    }

    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        self.conjunction.atoms()
    }

    #[must_use]
    pub fn matches(&self, bundle: &Bundle) -> bool {
        self.conjunction.holds(bundle)
    }
}
