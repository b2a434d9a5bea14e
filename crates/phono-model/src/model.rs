use crate::bundle::Bundle;
use crate::codec::{Codec, Rendering};
use crate::config::ModelConfig;
use crate::distance::{DistanceBuilder, DistanceModel, EuclideanBuilder};
use crate::error::{ModelError, Result};
use crate::inventory::Inventory;
use crate::registry::ValueRegistry;
use crate::resolver::Resolver;
use crate::table::{parse_feature_table, parse_grapheme_table};
use crate::text::split_names;
use crate::types::{FeatureRow, GraphemeRow};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Configures and loads a [`Model`]
pub struct ModelBuilder {
    name: String,
    config: ModelConfig,
    distance: Arc<dyn DistanceBuilder>,
}

impl ModelBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: ModelConfig::default(),
            distance: Arc::new(EuclideanBuilder),
        }
    }

    #[must_use]
    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default euclidean distance
    #[must_use]
    pub fn distance_builder(mut self, builder: Arc<dyn DistanceBuilder>) -> Self {
        self.distance = builder;
        self
    }

    /// Build from parsed rows; any invalid row aborts the load
    pub fn build(self, features: &[FeatureRow], graphemes: &[GraphemeRow]) -> Result<Model> {
        self.config.validate().map_err(ModelError::invalid_config)?;

        let registry = ValueRegistry::load(features, self.config.normalization)?;
        let inventory = Inventory::load(graphemes, &registry, self.config.normalization)?;

        log::info!(
            "loaded model `{}`: {} features, {} values, {} graphemes",
            self.name,
            registry.feature_count(),
            registry.value_count(),
            inventory.len()
        );

        Ok(Model {
            name: self.name,
            config: self.config,
            registry,
            inventory,
            distance_builder: self.distance,
            distance_model: OnceCell::new(),
        })
    }

    /// Build from the text of a feature table and a grapheme table
    pub fn build_from_tables(self, features: &str, graphemes: &str) -> Result<Model> {
        let features = parse_feature_table(features)?;
        let graphemes = parse_grapheme_table(graphemes)?;
        self.build(&features, &graphemes)
    }

    /// Load `model.tsv` and `sounds.tsv` from a directory.
    ///
    /// A `config.toml` next to them replaces the builder's configuration.
    pub fn load_dir(mut self, dir: impl AsRef<Path>) -> Result<Model> {
        let dir = dir.as_ref();
        let config_path = dir.join("config.toml");
        if config_path.is_file() {
            self.config = ModelConfig::from_file(&config_path)?;
        }
        let features = std::fs::read_to_string(dir.join("model.tsv"))?;
        let graphemes = std::fs::read_to_string(dir.join("sounds.tsv"))?;
        self.build_from_tables(&features, &graphemes)
    }
}

/// A loaded feature model: value registry plus grapheme inventory.
///
/// Never mutated after construction, so it can be shared across threads
/// freely. The distance model is fitted lazily, at most once.
pub struct Model {
    pub(crate) name: String,
    pub(crate) config: ModelConfig,
    pub(crate) registry: ValueRegistry,
    pub(crate) inventory: Inventory,
    distance_builder: Arc<dyn DistanceBuilder>,
    distance_model: OnceCell<Box<dyn DistanceModel>>,
}

impl Model {
    /// Load a model directory, named after the directory
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let name = dir
            .file_name()
            .map_or_else(|| "model".to_string(), |n| n.to_string_lossy().into_owned());
        ModelBuilder::new(name).load_dir(dir)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &ValueRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry, &self.config)
    }

    fn codec(&self) -> Codec<'_> {
        Codec::new(&self.registry, &self.inventory, &self.config)
    }

    /// Apply removals, then additions, then constraint closure
    pub fn resolve<A, R>(&self, existing: &Bundle, additions: &[A], removals: &[R]) -> Result<Bundle>
    where
        A: AsRef<str>,
        R: AsRef<str>,
    {
        self.resolver().resolve(existing, additions, removals)
    }

    /// Build a bundle from value names such as `"voiceless bilabial plosive consonant"`
    pub fn parse_description(&self, description: &str) -> Result<Bundle> {
        let names: Vec<&str> = split_names(description).collect();
        let mut by_feature: BTreeMap<&str, &str> = BTreeMap::new();
        for name in &names {
            let value = self.registry.lookup(name)?;
            if let Some(first) = by_feature.insert(&value.feature, &value.name) {
                if first != value.name {
                    return Err(ModelError::FeatureConflict {
                        feature: value.feature.clone(),
                        first: first.to_string(),
                        second: value.name.clone(),
                    });
                }
            }
        }
        self.resolve(&Bundle::new(), names.as_slice(), &[] as &[&str])
    }

    /// Grapheme string to bundle
    pub fn decode(&self, grapheme: &str) -> Result<Bundle> {
        self.codec().decode(grapheme)
    }

    /// Bundle to grapheme string
    pub fn encode(&self, bundle: &Bundle) -> Result<String> {
        self.render(bundle).map(Rendering::into_string)
    }

    /// Bundle to grapheme string, tagged with how it was built
    pub fn render(&self, bundle: &Bundle) -> Result<Rendering> {
        self.codec().render(bundle)
    }

    /// Value names ordered by rank, then name
    #[must_use]
    pub fn describe(&self, bundle: &Bundle) -> String {
        self.registry.describe(bundle)
    }

    #[must_use]
    pub fn feature_dict(&self, bundle: &Bundle) -> BTreeMap<String, String> {
        self.registry.feature_dict(bundle)
    }

    /// True if the bundle is listed as a class grapheme (such as `C`)
    #[must_use]
    pub fn is_class(&self, bundle: &Bundle) -> bool {
        self.inventory.by_bundle(bundle).is_some_and(|e| e.is_class)
    }

    /// Distance between two graphemes; zero when they decode to the same sound
    pub fn distance(&self, a: &str, b: &str) -> Result<f64> {
        let a = self.decode(a)?;
        let b = self.decode(b)?;
        self.distance_between(&a, &b)
    }

    /// Distance between two bundles
    pub fn distance_between(&self, a: &Bundle, b: &Bundle) -> Result<f64> {
        if a == b {
            return Ok(0.0);
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };

        let model = self
            .distance_model
            .get_or_try_init(|| self.distance_builder.fit(self))?;
        let distance = model.predict(&self.binary_values(first), &self.binary_values(second));

        if !distance.is_finite() {
            return Err(ModelError::Distance(format!(
                "non-finite distance between [{}] and [{}]",
                self.describe(first),
                self.describe(second)
            )));
        }
        Ok(distance.max(0.0))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("features", &self.registry.feature_count())
            .field("values", &self.registry.value_count())
            .field("graphemes", &self.inventory.len())
            .field("distance_fitted", &self.distance_model.get().is_some())
            .finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[`{}` model ({} features, {} values, {} graphemes)]",
            self.name,
            self.registry.feature_count(),
            self.registry.value_count(),
            self.inventory.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintPolicy;

    fn features() -> Vec<FeatureRow> {
        vec![
            FeatureRow::new("type", "consonant", 9),
            FeatureRow::new("type", "vowel", 9),
            FeatureRow::new("phonation", "voiced", 5),
            FeatureRow::new("phonation", "voiceless", 5),
            FeatureRow::new("place", "bilabial", 6).constraint("consonant"),
            FeatureRow::new("manner", "plosive", 7).constraint("consonant"),
        ]
    }

    fn graphemes() -> Vec<GraphemeRow> {
        vec![
            GraphemeRow::new("p", "voiceless bilabial plosive consonant"),
            GraphemeRow::new("b", "voiced bilabial plosive consonant"),
            GraphemeRow::new("V", "vowel").class(),
        ]
    }

    fn model() -> Model {
        ModelBuilder::new("tiny").build(&features(), &graphemes()).unwrap()
    }

    #[test]
    fn test_display_and_debug() {
        let model = model();
        assert_eq!(
            model.to_string(),
            "[`tiny` model (4 features, 6 values, 3 graphemes)]"
        );
        assert!(format!("{model:?}").contains("distance_fitted: false"));
    }

    #[test]
    fn test_parse_description() {
        let model = model();
        let p = model.parse_description("voiceless, bilabial plosive consonant").unwrap();
        assert_eq!(model.encode(&p).unwrap(), "p");
        assert_eq!(model.describe(&p), "voiceless bilabial plosive consonant");

        assert!(matches!(
            model.parse_description("voiced voiceless consonant"),
            Err(ModelError::FeatureConflict { .. })
        ));
        assert!(matches!(
            model.parse_description("bilabial vowel"),
            Err(ModelError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn test_lenient_description() {
        let model = ModelBuilder::new("tiny")
            .config(ModelConfig::lenient())
            .build(&features(), &graphemes())
            .unwrap();
        assert_eq!(model.config().policy, ConstraintPolicy::Drop);
        let bundle = model.parse_description("bilabial").unwrap();
        assert_eq!(model.describe(&bundle), "bilabial consonant");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ModelConfig {
            max_affix_depth: 0,
            ..Default::default()
        };
        assert!(matches!(
            ModelBuilder::new("tiny").config(config).build(&features(), &graphemes()),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_is_class() {
        let model = model();
        assert!(model.is_class(&model.decode("V").unwrap()));
        assert!(!model.is_class(&model.decode("p").unwrap()));
    }

    #[test]
    fn test_model_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Model>();
    }
}
