//! # Phono Model
//!
//! Feature-based phonological sounds and their grapheme representations.
//!
//! ## Philosophy
//!
//! A sound is a bundle of categorical feature values drawn from a model:
//! - Every value belongs to exactly one feature, and a bundle holds at most
//!   one value per feature
//! - Values may carry constraints (`plosive` requires `consonant`), checked
//!   every time a bundle changes
//! - Graphemes are a rendering of bundles, not their identity: sounds without
//!   an inventory entry are composed from a base plus diacritics
//!
//! ## Architecture
//!
//! ```text
//! Feature table ──> Value Registry ──> Constraint Evaluator
//!                        │
//! Grapheme table ──> Inventory
//!                        │
//!     additions/removals ├──> Bundle Resolver (exclusivity + closure)
//!                        │
//!                        ├──> Grapheme Codec
//!                        │    ├─> exact entry
//!                        │    ├─> base + prefixes/suffixes
//!                        │    └─> base[v1,v2] fallback
//!                        │
//!                        └──> Query Engine
//!                             ├─> constrained enumeration
//!                             ├─> minimal matrix / class features
//!                             └─> vectors + pluggable distance
//! ```
//!
//! ## Example
//!
//! ```rust
//! use phono_model::{builtin, Sound};
//!
//! let model = builtin::mipa().unwrap();
//!
//! let p = Sound::from_grapheme(&model, "p").unwrap();
//! let b = p.with_additions(&["voiced"]).unwrap();
//! assert_eq!(b.grapheme().unwrap(), "b");
//!
//! let vowels = model.values_to_graphemes("+vowel +front -close").unwrap();
//! assert!(vowels.contains(&"a".to_string()));
//! ```

pub mod builtin;
mod bundle;
mod codec;
mod config;
mod constraint;
mod distance;
mod error;
mod inventory;
mod model;
mod query;
mod registry;
mod resolver;
mod sound;
pub mod table;
mod text;
mod types;

pub use bundle::Bundle;
pub use codec::Rendering;
pub use config::{ConstraintPolicy, ModelConfig};
pub use constraint::{Atom, Conjunction, Constraint, Query};
pub use distance::{DistanceBuilder, DistanceModel, EuclideanBuilder};
pub use error::{ModelError, Result};
pub use inventory::{GraphemeEntry, Inventory};
pub use model::{Model, ModelBuilder};
pub use query::{FeatureMatrix, ValueVector};
pub use registry::{Affix, AffixPosition, Feature, Value, ValueRegistry};
pub use resolver::Resolver;
pub use sound::Sound;
pub use text::{replace_codepoints, NormalizationForm};
pub use types::{FeatureRow, GraphemeRow};
