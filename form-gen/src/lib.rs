pub mod config;
pub mod conjugate;
pub mod conllu;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod grammar;
pub mod lexicon;
pub mod msd;
pub mod romanian;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use config::EngineConfig;
pub use error::{InflectionMiss, MorphError, Result};
pub use extractor::{MorphExtractor, TreeNode};
pub use generator::{FilterSet, SyntheticFormGenerator};
pub use grammar::Grammar;
pub use lexicon::{Lexicon, SharedLexicon};
pub use msd::TagDictionary;

/// Feature name to value name, e.g. `Person` -> `1`.
pub type Features = BTreeMap<String, String>;

/// Tag class code (`V`, `N`, ...).
pub const CATEGORY: &str = "category";
pub const LEMMA: &str = "lemma";
/// Name of the compound form a feature map describes.
pub const SYNTH_FORM: &str = "SynthForm";
pub const TYPE: &str = "Type";
pub const MOOD: &str = "Mood";
pub const TENSE: &str = "Tense";
pub const PERSON: &str = "Person";
pub const NUMBER: &str = "Number";

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Copy,
    schemars::JsonSchema,
)]
pub enum PartOfSpeech {
    #[serde(rename = "ADJ")]
    Adj, // adjective
    #[serde(rename = "ADP")]
    Adp, // adposition
    #[serde(rename = "ADV")]
    Adv, // adverb
    #[serde(rename = "AUX")]
    Aux, // auxiliary
    #[serde(rename = "CCONJ")]
    Cconj, // coordinating conjunction
    #[serde(rename = "DET")]
    Det, // determiner
    #[serde(rename = "INTJ")]
    Intj, // interjection
    #[serde(rename = "NOUN")]
    Noun, // noun
    #[serde(rename = "NUM")]
    Num, // numeral
    #[serde(rename = "PART")]
    Part, // particle
    #[serde(rename = "PRON")]
    Pron, // pronoun
    #[serde(rename = "PROPN")]
    Propn, // proper noun
    #[serde(rename = "PUNCT")]
    Punct, // punctuation
    #[serde(rename = "SCONJ")]
    Sconj, // subordinating conjunction
    #[serde(rename = "SYM")]
    Sym, // symbol
    #[serde(rename = "VERB")]
    Verb, // verb
    #[serde(rename = "X")]
    X, // other
}

impl PartOfSpeech {
    /// Parse a universal POS tag such as `NOUN`.
    pub fn from_upos(upos: &str) -> Option<Self> {
        Some(match upos {
            "ADJ" => PartOfSpeech::Adj,
            "ADP" => PartOfSpeech::Adp,
            "ADV" => PartOfSpeech::Adv,
            "AUX" => PartOfSpeech::Aux,
            "CCONJ" => PartOfSpeech::Cconj,
            "DET" => PartOfSpeech::Det,
            "INTJ" => PartOfSpeech::Intj,
            "NOUN" => PartOfSpeech::Noun,
            "NUM" => PartOfSpeech::Num,
            "PART" => PartOfSpeech::Part,
            "PRON" => PartOfSpeech::Pron,
            "PROPN" => PartOfSpeech::Propn,
            "PUNCT" => PartOfSpeech::Punct,
            "SCONJ" => PartOfSpeech::Sconj,
            "SYM" => PartOfSpeech::Sym,
            "VERB" => PartOfSpeech::Verb,
            "X" => PartOfSpeech::X,
            _ => return None,
        })
    }

    /// Nominals get a case even when their tag leaves it open.
    pub fn is_nominal(self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::Adj | PartOfSpeech::Det | PartOfSpeech::Num
        )
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            PartOfSpeech::Adj => "adjective",
            PartOfSpeech::Adp => "adposition",
            PartOfSpeech::Adv => "adverb",
            PartOfSpeech::Aux => "auxiliary",
            PartOfSpeech::Cconj => "coordinating conjunction",
            PartOfSpeech::Det => "determiner",
            PartOfSpeech::Intj => "interjection",
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Num => "numeral",
            PartOfSpeech::Part => "particle",
            PartOfSpeech::Pron => "pronoun",
            PartOfSpeech::Propn => "proper noun",
            PartOfSpeech::Punct => "punctuation",
            PartOfSpeech::Sconj => "subordinating conjunction",
            PartOfSpeech::Sym => "symbol",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::X => "other",
        };
        write!(f, "{word}")
    }
}

/// Everything needed to generate and analyze forms of one language.
///
/// Cheap to clone: the tag inventory, grammar and configuration are shared,
/// and clones see the same lexicon counts.
#[derive(Debug, Clone)]
pub struct MorphEngine {
    config: Arc<EngineConfig>,
    generator: SyntheticFormGenerator,
    extractor: MorphExtractor,
    lexicon: SharedLexicon,
}

impl MorphEngine {
    pub fn new(
        dictionary: TagDictionary,
        grammar: Grammar,
        filters: FilterSet,
        lexicon: Lexicon,
        config: EngineConfig,
    ) -> Self {
        let dictionary = Arc::new(dictionary);
        let grammar = Arc::new(grammar);
        let config = Arc::new(config);
        Self {
            generator: SyntheticFormGenerator::new(
                dictionary.clone(),
                grammar.clone(),
                Arc::new(filters),
            ),
            extractor: MorphExtractor::new(dictionary, grammar, config.clone()),
            lexicon: SharedLexicon::new(lexicon),
            config,
        }
    }

    pub fn romanian(lexicon: Lexicon, config: EngineConfig) -> Result<Self> {
        let dictionary = romanian::tag_dictionary()?;
        let grammar = romanian::verb_grammar(&dictionary)?;
        Ok(Self::new(
            dictionary,
            grammar,
            romanian::filter_set(),
            lexicon,
            config,
        ))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &TagDictionary {
        self.generator.dictionary()
    }

    pub fn grammar(&self) -> &Grammar {
        self.generator.grammar()
    }

    pub fn lexicon(&self) -> &SharedLexicon {
        &self.lexicon
    }

    /// Ranked candidates per word for `features`.
    pub fn generate_form(&self, features: &Features) -> Result<Vec<Vec<String>>> {
        self.generator.generate_form(&self.lexicon.read(), features)
    }

    pub fn generate_best_form(&self, features: &Features) -> Result<Vec<String>> {
        self.generator
            .generate_best_form(&self.lexicon.read(), features)
    }

    pub fn rule_to_forms(&self, category: &str, context: &Features) -> Result<Vec<Vec<String>>> {
        self.generator
            .rule_to_forms(&self.lexicon.read(), category, context)
    }

    pub fn extract<N: TreeNode>(&self, node: &N) -> Result<(Features, Vec<String>)> {
        self.extractor.get_lemma_and_features(node)
    }

    /// Count a use of `form` so it ranks higher next time.
    pub fn confirm(&self, form: &str, lemma: Option<&str>, tag: Option<&str>) -> bool {
        self.lexicon.confirm(form, lemma, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_of_speech_from_upos() {
        assert_eq!(PartOfSpeech::from_upos("NOUN"), Some(PartOfSpeech::Noun));
        assert_eq!(PartOfSpeech::from_upos("noun"), None);
        for pos in [PartOfSpeech::Verb, PartOfSpeech::Sconj, PartOfSpeech::X] {
            let upos = serde_json::to_value(pos).unwrap();
            assert_eq!(PartOfSpeech::from_upos(upos.as_str().unwrap()), Some(pos));
        }
        assert_eq!(PartOfSpeech::Propn.to_string(), "proper noun");
    }

    #[test]
    fn test_engine_clones_share_counts() {
        let lexicon = Lexicon::read_tsv(
            "am\tavea\tVa--1s\naș\tavea\tVa--1s\n".as_bytes(),
            &Default::default(),
        )
        .unwrap();
        let engine = MorphEngine::romanian(lexicon, EngineConfig::default()).unwrap();
        let request = Features::from([
            (CATEGORY.to_string(), "V".to_string()),
            (TYPE.to_string(), "Aux".to_string()),
            (PERSON.to_string(), "1".to_string()),
            (NUMBER.to_string(), "Sing".to_string()),
            (LEMMA.to_string(), "avea".to_string()),
        ]);
        assert_eq!(engine.generate_best_form(&request).unwrap(), ["am"]);

        let clone = engine.clone();
        assert!(clone.confirm("aș", None, None));
        assert_eq!(engine.generate_best_form(&request).unwrap(), ["aș"]);
        assert_eq!(engine.grammar().categories().count(), 6);
    }
}
