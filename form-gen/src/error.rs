use std::collections::BTreeSet;

pub type Result<T, E = MorphError> = std::result::Result<T, E>;

/// Why a lemma lookup produced no inflection even though the lemma is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflectionMiss {
    /// Every tag of the lemma conflicts with the query tag.
    NoCompatibleTag,
    /// Compatible entries existed but the disambiguation filter removed all of them.
    FilteredOut,
}

impl std::fmt::Display for InflectionMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InflectionMiss::NoCompatibleTag => write!(f, "no compatible tag"),
            InflectionMiss::FilteredOut => write!(f, "all candidates filtered out"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    #[error("Unknown tag category in {tag:?}")]
    UnknownCategory { tag: String },

    #[error("Tag {tag:?} has {len} feature positions but class {category} declares {max}")]
    TagTooLong {
        tag: String,
        category: char,
        len: usize,
        max: usize,
    },

    #[error("Unknown value code {code:?} for feature {feature} in tag {tag:?}")]
    UnknownValueCode {
        tag: String,
        feature: String,
        code: char,
    },

    #[error("Value {value:?} is not declared by feature {feature}")]
    UnknownFeatureValue { feature: String, value: String },

    #[error("Missing required feature {0:?}")]
    MissingFeature(String),

    #[error("Invalid definition of feature {feature}: {reason}")]
    InvalidFeatureDefinition { feature: String, reason: String },

    #[error("Malformed lexicon record on line {line}: {reason}")]
    MalformedLexiconRecord { line: usize, reason: String },

    #[error("Lemma {0:?} not found in lexicon")]
    LemmaNotFound(String),

    #[error("No inflection of {lemma:?} matches tag {tag:?} ({reason})")]
    NoMatchingInflection {
        lemma: String,
        tag: String,
        reason: InflectionMiss,
    },

    #[error("Feature {feature} is ambiguous between {values:?} and has no merge entry")]
    AmbiguousReduction {
        feature: String,
        values: BTreeSet<String>,
    },

    #[error("No rule of {0:?} applies to the requested features")]
    NoApplicableRule(String),

    #[error("Could not resolve position {position} of periphrastic form {category}")]
    PartialPeriphrasticFailure {
        category: String,
        position: usize,
        #[source]
        source: Box<MorphError>,
    },

    #[error("Malformed CoNLL-U on line {line}: {reason}")]
    MalformedConllu { line: usize, reason: String },

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}
