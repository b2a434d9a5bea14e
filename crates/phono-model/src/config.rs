use crate::error::{ModelError, Result};
use crate::text::NormalizationForm;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration declared when a model is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// What to do with values whose constraint fails after resolution
    pub policy: ConstraintPolicy,

    /// Auto-add values required by a violated constraint when nothing contradicts them
    pub complete_implied: bool,

    /// Normalization applied to graphemes and affixes before lookups
    pub normalization: NormalizationForm,

    /// Include class graphemes (such as `C` or `V`) in constrained enumeration
    pub queries_include_classes: bool,

    /// Maximum number of affixes peeled off a grapheme while decoding
    pub max_affix_depth: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            policy: ConstraintPolicy::Reject,
            complete_implied: false,
            normalization: NormalizationForm::Nfd,
            queries_include_classes: true,
            max_affix_depth: 8,
        }
    }
}

impl ModelConfig {
    /// Fail loudly on any inconsistent value set
    pub fn strict() -> Self {
        Self::default()
    }

    /// Complete implied values and drop the ones that still fail
    pub fn lenient() -> Self {
        Self {
            policy: ConstraintPolicy::Drop,
            complete_implied: true,
            ..Default::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|err| ModelError::invalid_config(err.to_string()))?;
        config.validate().map_err(ModelError::invalid_config)?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_affix_depth == 0 {
            return Err("max_affix_depth must be > 0".to_string());
        }
        if self.max_affix_depth > 64 {
            return Err(format!(
                "max_affix_depth ({}) cannot exceed 64",
                self.max_affix_depth
            ));
        }
        Ok(())
    }
}

/// Handling of values whose constraint is not satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintPolicy {
    /// Fail the operation with a constraint violation
    #[default]
    Reject,

    /// Remove the value and re-check until nothing else fails
    Drop,
}
