//! Recovering feature descriptions from annotated dependency trees.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::grammar::{Grammar, Token};
use crate::msd::TagDictionary;
use crate::{Features, LEMMA, PERSON, PartOfSpeech, SYNTH_FORM, TYPE};

const CASE: &str = "Case";

/// A word in a dependency tree, as supplied by the treebank reader.
pub trait TreeNode: Clone {
    /// Identifier unique across the treebank.
    fn uid(&self) -> String;
    fn upos(&self) -> &str;
    fn lemma(&self) -> &str;
    fn xpos(&self) -> &str;
    fn deprel(&self) -> &str;
    /// A universal feature (`Case`, `Person`, ...) in its raw `a,b` form.
    fn feature(&self, name: &str) -> Option<&str>;
    fn parent(&self) -> Option<Self>;
    /// Dependents in sentence order.
    fn children(&self) -> Vec<Self>;
}

#[derive(Debug, Clone)]
pub struct MorphExtractor {
    dictionary: Arc<TagDictionary>,
    grammar: Arc<Grammar>,
    config: Arc<EngineConfig>,
}

impl MorphExtractor {
    pub fn new(
        dictionary: Arc<TagDictionary>,
        grammar: Arc<Grammar>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            dictionary,
            grammar,
            config,
        }
    }

    /// The lemma and features realized by `node`, plus the uids of every
    /// node taking part in the form.
    ///
    /// A verb is described together with its auxiliaries and particles when
    /// they make up a compound form known to the grammar; the result then
    /// carries a `SynthForm` entry.
    pub fn get_lemma_and_features<N: TreeNode>(&self, node: &N) -> Result<(Features, Vec<String>)> {
        let operator = self.is_copula_operator(node);
        let head = if operator {
            node.parent()
        } else if PartOfSpeech::from_upos(node.upos()) == Some(PartOfSpeech::Verb) {
            Some(node.clone())
        } else {
            None
        };
        if let Some(head) = head {
            if let Some(found) = self.match_compound(&head, operator)? {
                return Ok(found);
            }
        }
        self.describe_word(node, operator)
    }

    /// `fi` as copula or passive auxiliary: it takes over the role of the main verb.
    fn is_copula_operator<N: TreeNode>(&self, node: &N) -> bool {
        let rules = &self.config.extraction;
        node.upos() == "AUX"
            && node.lemma() == rules.copula_lemma
            && rules.copula_deprels.iter().any(|d| d == node.deprel())
    }

    fn match_compound<N: TreeNode>(
        &self,
        verb: &N,
        operator: bool,
    ) -> Result<Option<(Features, Vec<String>)>> {
        let rules = &self.config.extraction;
        let children = verb.children();
        let mut cluster: Vec<N> = children
            .iter()
            .filter(|child| {
                rules
                    .functional_deprels
                    .iter()
                    .any(|prefix| child.deprel().starts_with(prefix.as_str()))
                    && rules.functional_upos.iter().any(|u| u == child.upos())
            })
            .cloned()
            .collect();
        // a predicative nominal or passive participle is not part of the verb form
        if !children
            .iter()
            .any(|child| rules.copula_deprels.iter().any(|d| d == child.deprel()))
        {
            cluster.push(verb.clone());
        }

        let mut observed = cluster
            .iter()
            .map(|word| self.decode(word.xpos(), word.lemma()))
            .collect::<Result<Vec<_>>>()?;
        if operator {
            if let Some(last) = observed.last_mut() {
                last.insert(TYPE.to_string(), "Main".to_string());
            }
        }
        let tokens: Vec<Token> = observed.iter().map(Token::from_features).collect();

        let Some((category, values)) = self.grammar.matches(&tokens).into_iter().next() else {
            return Ok(None);
        };
        log::debug!("{} words match {category}", tokens.len());
        let mut features: Features = values
            .into_iter()
            .filter_map(|(feature, values)| values.into_iter().next().map(|v| (feature, v)))
            .collect();
        features.insert(SYNTH_FORM.to_string(), category);
        Ok(Some((features, cluster.iter().map(TreeNode::uid).collect())))
    }

    fn decode(&self, tag: &str, lemma: &str) -> Result<Features> {
        let mut features = self
            .dictionary
            .features_from_tag(tag, Some(&self.config.tag_normalization))?;
        features.insert(LEMMA.to_string(), lemma.to_string());
        Ok(features)
    }

    fn describe_word<N: TreeNode>(&self, node: &N, operator: bool) -> Result<(Features, Vec<String>)> {
        let rules = &self.config.extraction;
        let repaired = rules
            .determiner_repair
            .as_ref()
            .and_then(|repair| repair.apply(node.xpos()));
        let tag = repaired.as_deref().unwrap_or(node.xpos());
        let mut features = self.decode(tag, node.lemma())?;

        if operator {
            features.insert(TYPE.to_string(), "Main".to_string());
        }
        let Some(pos) = PartOfSpeech::from_upos(node.upos()) else {
            return Ok((features, vec![node.uid()]));
        };
        if pos == PartOfSpeech::Noun {
            features.insert(PERSON.to_string(), "3".to_string());
        }
        if pos.is_nominal() && !features.contains_key(CASE) {
            if let Some(case) = self.infer_case(node, pos) {
                features.insert(CASE.to_string(), case);
            }
        }
        Ok((features, vec![node.uid()]))
    }

    /// Direct or oblique, from the modifiers of the phrase the nominal belongs to.
    fn infer_case<N: TreeNode>(&self, node: &N, pos: PartOfSpeech) -> Option<String> {
        let rules = &self.config.extraction.case_inference;
        if node
            .children()
            .iter()
            .any(|child| child.deprel() == rules.predicative_deprel)
        {
            return Some(rules.direct.clone());
        }

        let phrase_root = match (pos, node.deprel()) {
            (PartOfSpeech::Det, _) if node.lemma() == rules.caseless_determiner => return None,
            (PartOfSpeech::Adj, "amod") | (PartOfSpeech::Num, "nummod") | (PartOfSpeech::Det, _) => {
                node.parent().unwrap_or_else(|| node.clone())
            }
            _ => node.clone(),
        };
        let oblique = phrase_root
            .children()
            .iter()
            .filter(|child| rules.modifier_deprels.iter().any(|d| d == child.deprel()))
            .filter_map(|child| child.feature(CASE).map(str::to_string))
            .any(|case| {
                case.split(',')
                    .any(|value| rules.oblique_cases.iter().any(|c| c == value))
            });
        Some(if oblique {
            rules.oblique.clone()
        } else {
            rules.direct.clone()
        })
    }
}
