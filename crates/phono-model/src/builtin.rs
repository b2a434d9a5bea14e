//! Models compiled into the crate.

use crate::error::Result;
use crate::model::{Model, ModelBuilder};
use once_cell::sync::OnceCell;

const MIPA_FEATURES: &str = include_str!("../models/mipa/model.tsv");
const MIPA_SOUNDS: &str = include_str!("../models/mipa/sounds.tsv");

static SHARED_MIPA: OnceCell<Model> = OnceCell::new();

/// Raw `mipa` feature and grapheme tables.
///
/// Pass them to [`ModelBuilder::build_from_tables`] to load the bundled model
/// with a non-default configuration.
#[must_use]
pub const fn mipa_tables() -> (&'static str, &'static str) {
    (MIPA_FEATURES, MIPA_SOUNDS)
}

/// A fresh copy of the bundled IPA-style model
pub fn mipa() -> Result<Model> {
    ModelBuilder::new("mipa").build_from_tables(MIPA_FEATURES, MIPA_SOUNDS)
}

/// Process-wide instance of [`mipa`], loaded on first use
pub fn shared_mipa() -> Result<&'static Model> {
    SHARED_MIPA.get_or_try_init(mipa)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_model_loads() {
        let model = mipa().unwrap();
        assert_eq!(model.registry().feature_count(), 19);
        assert_eq!(model.registry().value_count(), 49);
        assert_eq!(model.inventory().len(), 93);
        assert_eq!(
            model.to_string(),
            "[`mipa` model (19 features, 49 values, 93 graphemes)]"
        );
    }

    #[test]
    fn test_shared_instance_is_reused() {
        let first = shared_mipa().unwrap();
        let second = shared_mipa().unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
