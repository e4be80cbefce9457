use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lexicon::NegationHeuristic;
use crate::msd::TagNormalization;
use crate::romanian;

/// Tunable heuristics. Every field has a default, so a config file only
/// needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    pub negation: NegationHeuristic,
    pub tag_normalization: TagNormalization,
    pub extraction: ExtractionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            negation: NegationHeuristic::default(),
            tag_normalization: romanian::reference_tag_normalization(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lemma of the copula / passive auxiliary.
    pub copula_lemma: String,
    /// Relations under which that lemma is an operator rather than a word of its own.
    pub copula_deprels: Vec<String>,
    /// Relation prefixes of the function words collected around a verb.
    pub functional_deprels: Vec<String>,
    pub functional_upos: Vec<String>,
    pub case_inference: CaseInference,
    pub determiner_repair: Option<TagRepair>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            copula_lemma: "fi".to_string(),
            copula_deprels: vec!["aux:pass".to_string(), "cop".to_string()],
            functional_deprels: vec!["aux".to_string(), "mark".to_string(), "cop".to_string()],
            functional_upos: vec!["AUX".to_string(), "PART".to_string(), "VERB".to_string()],
            case_inference: CaseInference::default(),
            determiner_repair: Some(TagRepair::default()),
        }
    }
}

/// How nominals without an explicit case get one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct CaseInference {
    /// A nominal with a child under this relation is predicative.
    pub predicative_deprel: String,
    pub modifier_deprels: Vec<String>,
    pub oblique_cases: Vec<String>,
    pub direct: String,
    pub oblique: String,
    /// Genitival article that never receives a case of its own.
    pub caseless_determiner: String,
}

impl Default for CaseInference {
    fn default() -> Self {
        Self {
            predicative_deprel: "cop".to_string(),
            modifier_deprels: vec!["det".to_string(), "nummod".to_string(), "amod".to_string()],
            oblique_cases: vec!["Gen".to_string(), "Dat".to_string()],
            direct: "Dir".to_string(),
            oblique: "Obl".to_string(),
            caseless_determiner: "al".to_string(),
        }
    }
}

/// Overlong tags of one class are shortened by dropping a `-` from the last `--`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct TagRepair {
    pub category: char,
    pub length: usize,
}

impl Default for TagRepair {
    fn default() -> Self {
        Self {
            category: 'D',
            length: 10,
        }
    }
}

impl TagRepair {
    pub fn apply(&self, tag: &str) -> Option<String> {
        if !tag.starts_with(self.category) || tag.chars().count() != self.length {
            return None;
        }
        let at = tag.rfind("--")?;
        let mut repaired = tag.to_string();
        repaired.remove(at);
        Some(repaired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"negation": {"prefix": "in"}}"#).unwrap();
        assert_eq!(config.negation.prefix, "in");
        assert_eq!(config.negation.match_len, 3);
        assert_eq!(config.tag_normalization.len(), 37);
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"tag_normalization": {"Ncmrn": "Ncmprn"}, "extraction": {"determiner_repair": null}}"#,
        )
        .unwrap();
        let config = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.tag_normalization.len(), 1);
        assert_eq!(config.extraction.determiner_repair, None);
        assert_eq!(config.extraction.copula_lemma, "fi");
    }

    #[test]
    fn test_determiner_repair() {
        let repair = TagRepair::default();
        assert_eq!(repair.apply("Di3-sr---y").as_deref(), Some("Di3-sr--y"));
        assert_eq!(repair.apply("Di3-sr--y"), None);
        assert_eq!(repair.apply("Vmip1s---y"), None);
        assert_eq!(repair.apply("Dabcdefghi"), None);
    }
}
