use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

static CODEPOINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[Uu]\+([0-9A-Fa-f]{4,6})").expect("static codepoint pattern"));

static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][-_a-z]*$").expect("static name pattern"));

/// Unicode normalization applied to graphemes and affixes before any comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationForm {
    /// Canonical decomposition
    #[default]
    Nfd,
    /// Canonical composition
    Nfc,
    /// Leave strings untouched (only trimmed)
    None,
}

impl NormalizationForm {
    /// Normalize and trim a grapheme string
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        let text = text.trim();
        match self {
            Self::Nfd => text.nfd().collect(),
            Self::Nfc => text.nfc().collect(),
            Self::None => text.to_string(),
        }
    }
}

/// Replace `U+XXXX` code point references with the characters they name.
///
/// Text outside of a reference is kept as is, so `"aU+0283o"` becomes `"aʃo"`.
/// References to invalid scalar values are left unchanged.
#[must_use]
pub fn replace_codepoints(text: &str) -> String {
    CODEPOINT
        .replace_all(text, |caps: &regex::Captures<'_>| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Split a description into value names.
///
/// Accepted delimiters are whitespace, commas, semicolons and forward slashes.
pub fn split_names(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '/'))
        .filter(|name| !name.is_empty())
}

/// Check a feature or value name against the naming rules
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}
