//! A small feature-structure grammar.
//!
//! Rules rewrite a grammatical category (e.g. a compound tense) into an ordered
//! sequence of word-level [`Token`]s. A token feature can be marked
//! [`Constraint::Agree`], meaning its value is inherited from the caller's
//! features when the rule is expanded, and captured from the observed word when
//! the rule is matched in reverse.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::Features;
use crate::error::{MorphError, Result};

/// Explicit resolutions for feature value sets that a rule leaves ambiguous.
pub type MergeTable = BTreeMap<BTreeSet<String>, String>;

/// Per-feature value sets captured by matching a rule.
pub type ValueSets = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Inherit the value from the surrounding context.
    Agree,
    /// Any of these values is admissible.
    Values(BTreeSet<String>),
}

impl Constraint {
    pub fn value(value: &str) -> Self {
        Constraint::Values(BTreeSet::from([value.to_string()]))
    }

    fn admits(&self, value: &str) -> bool {
        match self {
            Constraint::Agree => true,
            Constraint::Values(values) => values.contains(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token(BTreeMap<String, Constraint>);

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_features(features: &Features) -> Self {
        Self(
            features
                .iter()
                .map(|(k, v)| (k.clone(), Constraint::value(v)))
                .collect(),
        )
    }

    pub fn with(mut self, feature: &str, value: &str) -> Self {
        self.0.insert(feature.to_string(), Constraint::value(value));
        self
    }

    pub fn with_any_of(mut self, feature: &str, values: &[&str]) -> Self {
        self.0.insert(
            feature.to_string(),
            Constraint::Values(values.iter().map(|v| v.to_string()).collect()),
        );
        self
    }

    pub fn agree(mut self, feature: &str) -> Self {
        self.0.insert(feature.to_string(), Constraint::Agree);
        self
    }

    /// Add every feature of `features` as a single-valued constraint.
    pub fn with_features(mut self, features: &Features) -> Self {
        for (k, v) in features {
            self.0.insert(k.clone(), Constraint::value(v));
        }
        self
    }

    pub fn get(&self, feature: &str) -> Option<&Constraint> {
        self.0.get(feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.0.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `other` has every feature this token constrains, with an overlapping value.
    pub fn matches(&self, other: &Token) -> bool {
        self.0
            .iter()
            .all(|(feature, constraint)| match (constraint, other.0.get(feature)) {
                (_, None) => false,
                (Constraint::Agree, Some(_)) | (_, Some(Constraint::Agree)) => true,
                (Constraint::Values(ours), Some(Constraint::Values(theirs))) => {
                    !ours.is_disjoint(theirs)
                }
            })
    }

    pub fn apply_agree_values(&self, context: &Features) -> Token {
        let mut token = self.clone();
        for (feature, constraint) in token.0.iter_mut() {
            if *constraint == Constraint::Agree {
                if let Some(value) = context.get(feature) {
                    *constraint = Constraint::value(value);
                }
            }
        }
        token
    }

    /// Assign concrete values, or `None` if one of them contradicts a constraint.
    pub fn apply_values(&self, context: &Features) -> Option<Token> {
        let mut token = self.clone();
        for (feature, value) in context {
            if let Some(constraint) = self.0.get(feature) {
                if !constraint.admits(value) {
                    return None;
                }
            }
            token.0.insert(feature.clone(), Constraint::value(value));
        }
        Some(token)
    }

    /// Collapse every value set to one value.
    ///
    /// Empty sets and unresolved agreement become unset. A set with several
    /// values must appear in `merge_table`.
    pub fn reduce_to_single(&self, merge_table: &MergeTable) -> Result<Features> {
        let mut resolved = Features::new();
        for (feature, constraint) in &self.0 {
            let Constraint::Values(values) = constraint else {
                continue;
            };
            let mut iter = values.iter();
            match (iter.next(), iter.next()) {
                (None, _) => {}
                (Some(value), None) => {
                    resolved.insert(feature.clone(), value.clone());
                }
                _ => {
                    let merged = merge_table.get(values).ok_or_else(|| {
                        MorphError::AmbiguousReduction {
                            feature: feature.clone(),
                            values: values.clone(),
                        }
                    })?;
                    resolved.insert(feature.clone(), merged.clone());
                }
            }
        }
        Ok(resolved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub name: String,
    pub requirement: Token,
}

impl Atom {
    pub fn new(name: &str, requirement: Token) -> Self {
        Self {
            name: name.to_string(),
            requirement,
        }
    }

    /// Check one observed word against this atom and capture its agreement values.
    ///
    /// Constrained features the observation lacks are tolerated.
    fn capture(&self, observed: &Token) -> Option<ValueSets> {
        let mut captured = ValueSets::new();
        for (feature, required) in &self.requirement.0 {
            let Some(Constraint::Values(seen)) = observed.0.get(feature) else {
                continue;
            };
            match required {
                Constraint::Agree => {
                    captured.insert(feature.clone(), seen.clone());
                }
                Constraint::Values(allowed) => {
                    if allowed.is_disjoint(seen) {
                        return None;
                    }
                }
            }
        }
        Some(captured)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub target: Atom,
    pub expansion: Vec<Atom>,
}

impl Rule {
    pub fn new(target: Atom, expansion: Vec<Atom>) -> Self {
        Self { target, expansion }
    }

    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn generate(&self, context: &Features) -> Option<Vec<Token>> {
        self.target.requirement.apply_values(context)?;
        Some(
            self.expansion
                .iter()
                .map(|atom| atom.requirement.apply_agree_values(context))
                .collect(),
        )
    }

    /// Capture the feature values of an observed word sequence.
    ///
    /// Besides each expansion atom matching its word, the captured values
    /// must intersect the target's own value constraints. A rule restricted
    /// to persons 1 and 2 therefore rejects a third-person cluster even when
    /// every word matches its atom.
    pub fn matches(&self, observed: &[Token]) -> Option<ValueSets> {
        if observed.len() != self.expansion.len() {
            return None;
        }
        let mut merged = ValueSets::new();
        for (atom, token) in self.expansion.iter().zip(observed) {
            for (feature, values) in atom.capture(token)? {
                merged.entry(feature).or_default().extend(values);
            }
        }
        for (feature, values) in &merged {
            if let Some(Constraint::Values(allowed)) = self.target.requirement.0.get(feature) {
                if allowed.is_disjoint(values) {
                    return None;
                }
            }
        }
        Some(merged)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: IndexMap<String, Vec<Rule>>,
    merge_table: MergeTable,
}

impl Grammar {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut by_name: IndexMap<String, Vec<Rule>> = IndexMap::new();
        for rule in rules {
            by_name.entry(rule.name().to_string()).or_default().push(rule);
        }
        Self {
            rules: by_name,
            merge_table: MergeTable::new(),
        }
    }

    pub fn with_merge_table(mut self, merge_table: MergeTable) -> Self {
        self.merge_table = merge_table;
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn rules(&self, category: &str) -> &[Rule] {
        self.rules.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// One reduced token sequence per rule of `category` that accepts `context`.
    pub fn generate(&self, category: &str, context: &Features) -> Result<Vec<Vec<Features>>> {
        let mut sequences = Vec::new();
        for rule in self.rules(category) {
            let Some(tokens) = rule.generate(context) else {
                continue;
            };
            if tokens.is_empty() {
                continue;
            }
            let sequence = tokens
                .iter()
                .map(|token| token.reduce_to_single(&self.merge_table))
                .collect::<Result<Vec<_>>>()?;
            sequences.push(sequence);
        }
        log::debug!(
            "{category}: {} of {} rules apply",
            sequences.len(),
            self.rules(category).len()
        );
        Ok(sequences)
    }

    /// Every `(category, captured values)` whose rule matches `observed`, in registration order.
    pub fn matches(&self, observed: &[Token]) -> Vec<(String, ValueSets)> {
        self.rules
            .iter()
            .flat_map(|(name, rules)| {
                rules
                    .iter()
                    .filter_map(|rule| rule.matches(observed))
                    .map(move |values| (name.clone(), values))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(pairs: &[(&str, &str)]) -> Features {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_matches_requires_every_constrained_feature() {
        let token = Token::new().with_any_of("Person", &["1", "2"]).agree("lemma");
        let observed = Token::from_features(&features(&[("Person", "2"), ("lemma", "fi")]));
        assert!(token.matches(&observed));

        let wrong_person = Token::from_features(&features(&[("Person", "3"), ("lemma", "fi")]));
        assert!(!token.matches(&wrong_person));

        let no_lemma = Token::from_features(&features(&[("Person", "1")]));
        assert!(!token.matches(&no_lemma));
    }

    #[test]
    fn test_apply_agree_values_leaves_concrete_constraints() {
        let token = Token::new().agree("Person").with("Type", "Aux");
        let applied = token.apply_agree_values(&features(&[("Person", "2"), ("Type", "Main")]));
        assert_eq!(applied.get("Person"), Some(&Constraint::value("2")));
        assert_eq!(applied.get("Type"), Some(&Constraint::value("Aux")));
    }

    #[test]
    fn test_apply_values_rejects_conflicts() {
        let token = Token::new()
            .with_any_of("Person", &["1", "2"])
            .agree("Number");
        let accepted = token
            .apply_values(&features(&[("Person", "1"), ("Number", "Plur"), ("lemma", "a")]))
            .unwrap();
        assert_eq!(accepted.get("Person"), Some(&Constraint::value("1")));
        assert_eq!(accepted.get("lemma"), Some(&Constraint::value("a")));
        assert!(token.apply_values(&features(&[("Person", "3")])).is_none());
    }

    #[test]
    fn test_reduce_to_single() {
        let token = Token::new()
            .with("Type", "Aux")
            .with_any_of("Gender", &[])
            .agree("lemma");
        assert_eq!(
            token.reduce_to_single(&MergeTable::new()).unwrap(),
            features(&[("Type", "Aux")])
        );
    }

    #[test]
    fn test_reduce_ambiguous_set_needs_merge_entry() {
        let token = Token::new().with_any_of("Person", &["A", "B"]);
        match token.reduce_to_single(&MergeTable::new()) {
            Err(MorphError::AmbiguousReduction { feature, values }) => {
                assert_eq!(feature, "Person");
                assert_eq!(values, set(&["A", "B"]));
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }

        let table = MergeTable::from([(set(&["A", "B"]), "AB".to_string())]);
        assert_eq!(
            token.reduce_to_single(&table).unwrap(),
            features(&[("Person", "AB")])
        );
    }

    fn two_word_rule() -> Rule {
        Rule::new(
            Atom::new("Compound", Token::new().agree("Person").agree("lemma")),
            vec![
                Atom::new(
                    "Aux",
                    Token::new().with("Type", "Aux").with("lemma", "avea").agree("Person"),
                ),
                Atom::new("Main", Token::new().with("Type", "Main").agree("lemma")),
            ],
        )
    }

    #[test]
    fn test_rule_generate_propagates_agreement() {
        let tokens = two_word_rule()
            .generate(&features(&[("Person", "2"), ("lemma", "cânta")]))
            .unwrap();
        assert_eq!(
            tokens[0].reduce_to_single(&MergeTable::new()).unwrap(),
            features(&[("Person", "2"), ("Type", "Aux"), ("lemma", "avea")])
        );
        assert_eq!(
            tokens[1].reduce_to_single(&MergeTable::new()).unwrap(),
            features(&[("Type", "Main"), ("lemma", "cânta")])
        );
    }

    #[test]
    fn test_rule_match_unions_captures() {
        let rule = two_word_rule();
        let observed = vec![
            Token::from_features(&features(&[("Type", "Aux"), ("lemma", "avea"), ("Person", "3")])),
            Token::from_features(&features(&[("Type", "Main"), ("lemma", "cânta")])),
        ];
        let values = rule.matches(&observed).unwrap();
        assert_eq!(values.get("Person"), Some(&set(&["3"])));
        assert_eq!(values.get("lemma"), Some(&set(&["cânta"])));

        assert!(rule.matches(&observed[..1]).is_none());
        let wrong_aux = vec![
            Token::from_features(&features(&[("Type", "Aux"), ("lemma", "vrea")])),
            observed[1].clone(),
        ];
        assert!(rule.matches(&wrong_aux).is_none());
    }

    #[test]
    fn test_grammar_generate_collects_every_applicable_rule() {
        let near = Rule::new(
            Atom::new("Deixis", Token::new().with_any_of("Person", &["1", "2"])),
            vec![Atom::new("Word", Token::new().with("lemma", "acesta"))],
        );
        let far = Rule::new(
            Atom::new("Deixis", Token::new().with("Person", "3")),
            vec![Atom::new("Word", Token::new().with("lemma", "acela"))],
        );
        let either = Rule::new(
            Atom::new("Deixis", Token::new()),
            vec![Atom::new("Word", Token::new().with("lemma", "ăsta"))],
        );
        let grammar = Grammar::new([near, far, either]);

        let sequences = grammar
            .generate("Deixis", &features(&[("Person", "3")]))
            .unwrap();
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0][0].get("lemma").unwrap(), "acela");
        assert_eq!(sequences[1][0].get("lemma").unwrap(), "ăsta");

        assert!(grammar.generate("Missing", &Features::new()).unwrap().is_empty());
    }

    #[test]
    fn test_grammar_generate_fails_on_ambiguity() {
        let rule = Rule::new(
            Atom::new("Loose", Token::new()),
            vec![Atom::new("Word", Token::new().with_any_of("Person", &["A", "B"]))],
        );
        let grammar = Grammar::new([rule]);
        assert!(matches!(
            grammar.generate("Loose", &Features::new()),
            Err(MorphError::AmbiguousReduction { .. })
        ));
    }
}
