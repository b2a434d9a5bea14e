use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while loading a model or operating on its sounds
#[derive(Error, Debug)]
pub enum ModelError {
    /// A value name was defined twice
    #[error("Duplicate value `{value}` at row {row} (already defined for feature `{feature}`)")]
    DuplicateValue {
        row: usize,
        value: String,
        feature: String,
    },

    /// A constraint or query string does not follow the grammar
    #[error("Malformed constraint `{text}` for `{owner}`: {reason}")]
    MalformedConstraint {
        owner: String,
        text: String,
        reason: String,
    },

    /// The name is not a value of the model
    #[error("Unknown value `{0}`")]
    UnknownValue(String),

    /// The name is not a feature of the model
    #[error("Unknown feature `{0}`")]
    UnknownFeature(String),

    /// A value's constraint is unsatisfied by the rest of the bundle
    #[error("Value `{value}` violates its constraint in bundle [{bundle}]")]
    ConstraintViolation { value: String, bundle: String },

    /// The string cannot be decoded into a bundle
    #[error("Unknown grapheme `{0}`")]
    UnknownGrapheme(String),

    /// Two inputs decode to the same bundle
    #[error("Graphemes `{first}` and `{second}` describe the same sound")]
    AmbiguousInput { first: String, second: String },

    /// A grapheme string was listed twice in the inventory
    #[error("Duplicate grapheme `{0}`")]
    DuplicateGrapheme(String),

    /// Two graphemes share the same description
    #[error("Graphemes `{previous}` and `{grapheme}` share the same description")]
    DuplicateBundle { grapheme: String, previous: String },

    /// A feature or value name does not match the naming rules
    #[error("Invalid {kind} name `{name}` at row {row}")]
    InvalidName {
        row: usize,
        kind: &'static str,
        name: String,
    },

    /// Ranks must be positive integers
    #[error("Invalid rank {rank} for value `{value}` at row {row} (must be >= 1)")]
    InvalidRank { row: usize, value: String, rank: i64 },

    /// The grapheme string is empty or uses reserved characters
    #[error("Invalid grapheme `{0}`")]
    InvalidGrapheme(String),

    /// Two values claim the same diacritic
    #[error("Affix `{affix}` of `{value}` is already used by `{previous}`")]
    DuplicateAffix {
        affix: String,
        value: String,
        previous: String,
    },

    /// A description names two values of the same feature
    #[error("Values `{first}` and `{second}` both belong to feature `{feature}`")]
    FeatureConflict {
        feature: String,
        first: String,
        second: String,
    },

    /// An inventory row failed validation
    #[error("Grapheme `{grapheme}`: {source}")]
    InvalidEntry {
        grapheme: String,
        #[source]
        source: Box<ModelError>,
    },

    /// Malformed tabular input
    #[error("Table error at line {line}: {message}")]
    Table { line: usize, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pluggable distance model failed
    #[error("Distance model error: {0}")]
    Distance(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Create a malformed constraint error
    pub fn malformed(
        owner: impl Into<String>,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedConstraint {
            owner: owner.into(),
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown value error
    pub fn unknown_value(value: impl Into<String>) -> Self {
        Self::UnknownValue(value.into())
    }

    /// Create an unknown grapheme error
    pub fn unknown_grapheme(grapheme: impl Into<String>) -> Self {
        Self::UnknownGrapheme(grapheme.into())
    }

    /// Create a table error
    pub fn table(line: usize, message: impl Into<String>) -> Self {
        Self::Table {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Wrap an error with the inventory row it came from
    pub fn in_entry(self, grapheme: impl Into<String>) -> Self {
        Self::InvalidEntry {
            grapheme: grapheme.into(),
            source: Box::new(self),
        }
    }
}
