//! Turning feature requests into surface forms.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MorphError, Result};
use crate::grammar::Grammar;
use crate::lexicon::{EntryFilter, Lexicon, LexiconEntry};
use crate::msd::TagDictionary;
use crate::{Features, LEMMA, SYNTH_FORM};

/// Lexicon filters keyed by grammar category, with an optional fallback.
#[derive(Default)]
pub struct FilterSet {
    default: Option<Box<EntryFilter>>,
    by_category: HashMap<String, Box<EntryFilter>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(
        mut self,
        filter: impl Fn(&LexiconEntry, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(Box::new(filter));
        self
    }

    pub fn with_category(
        mut self,
        category: &str,
        filter: impl Fn(&LexiconEntry, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.by_category
            .insert(category.to_string(), Box::new(filter));
        self
    }

    pub fn default_filter(&self) -> Option<&EntryFilter> {
        self.default.as_deref()
    }

    /// The filter for `category`, or the default one.
    pub fn for_category(&self, category: &str) -> Option<&EntryFilter> {
        match self.by_category.get(category) {
            Some(filter) => Some(filter.as_ref()),
            None => self.default_filter(),
        }
    }
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut categories: Vec<&str> = self.by_category.keys().map(String::as_str).collect();
        categories.sort_unstable();
        f.debug_struct("FilterSet")
            .field("default", &self.default.is_some())
            .field("categories", &categories)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticFormGenerator {
    dictionary: Arc<TagDictionary>,
    grammar: Arc<Grammar>,
    filters: Arc<FilterSet>,
}

impl SyntheticFormGenerator {
    pub fn new(
        dictionary: Arc<TagDictionary>,
        grammar: Arc<Grammar>,
        filters: Arc<FilterSet>,
    ) -> Self {
        Self {
            dictionary,
            grammar,
            filters,
        }
    }

    pub fn dictionary(&self) -> &TagDictionary {
        &self.dictionary
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Ranked candidates for every word of the periphrastic form `category`.
    ///
    /// Either every position resolves or the whole form fails.
    pub fn rule_to_forms(
        &self,
        lexicon: &Lexicon,
        category: &str,
        context: &Features,
    ) -> Result<Vec<Vec<String>>> {
        let tokens = self
            .grammar
            .generate(category, context)?
            .into_iter()
            .next()
            .ok_or_else(|| MorphError::NoApplicableRule(category.to_string()))?;
        let filter = self.filters.for_category(category);

        tokens
            .iter()
            .enumerate()
            .map(|(position, token)| {
                let lemma = token
                    .get(LEMMA)
                    .ok_or_else(|| MorphError::MissingFeature(LEMMA.to_string()))?;
                let tag = self.dictionary.tag_from_features(token)?;
                log::debug!("{category}[{position}]: {lemma} {tag}");
                lexicon
                    .lookup_by_lemma(lemma, &tag, filter)
                    .map_err(|source| match source {
                        MorphError::LemmaNotFound(_) | MorphError::NoMatchingInflection { .. } => {
                            MorphError::PartialPeriphrasticFailure {
                                category: category.to_string(),
                                position,
                                source: Box::new(source),
                            }
                        }
                        other => other,
                    })
            })
            .collect()
    }

    pub fn rule_to_best_forms(
        &self,
        lexicon: &Lexicon,
        category: &str,
        context: &Features,
    ) -> Result<Vec<String>> {
        Ok(best_of(self.rule_to_forms(lexicon, category, context)?))
    }

    /// Ranked candidates for `features`, one list per word.
    ///
    /// A `SynthForm` entry selects a periphrastic category; otherwise the
    /// features describe a single inflected word.
    pub fn generate_form(&self, lexicon: &Lexicon, features: &Features) -> Result<Vec<Vec<String>>> {
        let lemma = features
            .get(LEMMA)
            .ok_or_else(|| MorphError::MissingFeature(LEMMA.to_string()))?;
        if let Some(category) = features.get(SYNTH_FORM) {
            return self.rule_to_forms(lexicon, category, features);
        }
        let tag = self.dictionary.tag_from_features(features)?;
        log::debug!("{lemma} {tag}");
        let forms = lexicon.lookup_by_lemma(lemma, &tag, self.filters.default_filter())?;
        Ok(vec![forms])
    }

    pub fn generate_best_form(&self, lexicon: &Lexicon, features: &Features) -> Result<Vec<String>> {
        Ok(best_of(self.generate_form(lexicon, features)?))
    }
}

fn best_of(candidates: Vec<Vec<String>>) -> Vec<String> {
    candidates
        .into_iter()
        .filter_map(|forms| forms.into_iter().next())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{LexiconRecord, NegationHeuristic};
    use crate::romanian;

    fn features(pairs: &[(&str, &str)]) -> Features {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn generator() -> SyntheticFormGenerator {
        let dictionary = romanian::tag_dictionary().unwrap();
        let grammar = romanian::verb_grammar(&dictionary).unwrap();
        SyntheticFormGenerator::new(
            Arc::new(dictionary),
            Arc::new(grammar),
            Arc::new(romanian::filter_set()),
        )
    }

    fn lexicon() -> Lexicon {
        let records = [
            ("am", "avea", "Va--1s", 10),
            ("aș", "avea", "Va--1s", 20),
            ("a", "avea", "Va--3s", 5),
            ("ar", "avea", "Va--3s", 1),
            ("voi", "vrea", "Va--1s", 3),
            ("fi", "fi", "Van", 0),
            ("mâncat", "mânca", "Vmp--sm", 1),
            ("nemâncat", "mânca", "Vmp--sm", 7),
            ("mânca", "mânca", "Vmn", 0),
        ]
        .into_iter()
        .map(|(form, lemma, tag, usage_count)| LexiconRecord {
            form: form.to_string(),
            lemma: lemma.to_string(),
            tag: tag.to_string(),
            usage_count,
        });
        Lexicon::from_records(records, &NegationHeuristic::default()).unwrap()
    }

    fn request(category: &str, person: &str) -> Features {
        features(&[
            ("lemma", "mânca"),
            ("category", "V"),
            ("Type", "Main"),
            ("Mood", "Ind"),
            ("Person", person),
            ("Number", "Sing"),
            ("SynthForm", category),
        ])
    }

    #[test]
    fn test_direct_form_skips_negated_homograph() {
        let forms = generator()
            .generate_form(
                &lexicon(),
                &features(&[
                    ("lemma", "mânca"),
                    ("category", "V"),
                    ("Type", "Main"),
                    ("Mood", "Part"),
                    ("Number", "Sing"),
                    ("Gender", "Masc"),
                ]),
            )
            .unwrap();
        assert_eq!(forms, [["mâncat"]]);
    }

    #[test]
    fn test_auxiliary_filters_depend_on_category() {
        let generator = generator();
        let lexicon = lexicon();
        let best = |category: &str, person: &str| {
            generator
                .generate_best_form(&lexicon, &request(category, person))
                .unwrap()
        };
        assert_eq!(best(romanian::PAST_PERFECT, "1"), ["am", "mâncat"]);
        assert_eq!(best(romanian::CONDITIONAL, "1"), ["aș", "mânca"]);
        assert_eq!(best(romanian::PAST_PERFECT, "3"), ["a", "mâncat"]);
        assert_eq!(best(romanian::CONDITIONAL, "3"), ["ar", "mânca"]);
        assert_eq!(
            best(romanian::CONDITIONAL_PERFECT, "3"),
            ["ar", "fi", "mâncat"]
        );
    }

    #[test]
    fn test_periphrastic_form_is_all_or_nothing() {
        let mut request = request(romanian::FUTURE, "1");
        request.insert("lemma".to_string(), "zbura".to_string());
        match generator().generate_form(&lexicon(), &request) {
            Err(MorphError::PartialPeriphrasticFailure {
                category,
                position,
                source,
            }) => {
                assert_eq!(category, romanian::FUTURE);
                assert_eq!(position, 1);
                assert!(matches!(*source, MorphError::LemmaNotFound(_)));
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
    }

    #[test]
    fn test_request_errors() {
        let generator = generator();
        let lexicon = lexicon();
        assert!(matches!(
            generator.generate_form(&lexicon, &request("Gerundive", "1")),
            Err(MorphError::NoApplicableRule(_))
        ));

        let mut no_lemma = request(romanian::FUTURE, "1");
        no_lemma.remove("lemma");
        assert!(matches!(
            generator.generate_form(&lexicon, &no_lemma),
            Err(MorphError::MissingFeature(feature)) if feature == "lemma"
        ));

        let no_category = features(&[("lemma", "mânca"), ("Mood", "Inf")]);
        assert!(matches!(
            generator.generate_form(&lexicon, &no_category),
            Err(MorphError::MissingFeature(feature)) if feature == "category"
        ));
    }

    #[test]
    fn test_rule_to_forms_keeps_every_candidate() {
        let forms = generator()
            .rule_to_forms(&lexicon(), romanian::PAST_PERFECT, &request("", "1"))
            .unwrap();
        assert_eq!(forms, vec![vec!["am"], vec!["mâncat"]]);
    }
}
