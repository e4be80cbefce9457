//! Typed shortcuts for the indicative conjugation of a verb.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};
use crate::{CATEGORY, Features, LEMMA, MOOD, MorphEngine, NUMBER, PERSON, SYNTH_FORM, TENSE, TYPE};

/// A closed set of values of one feature, spelled the way the tag inventory spells them.
pub trait FeatureValue: Sized + Copy + 'static {
    fn name() -> &'static str;
    fn all() -> &'static [Self];
    fn value(self) -> &'static str;

    fn parse_value(value: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|v| v.value() == value)
            .ok_or_else(|| MorphError::UnknownFeatureValue {
                feature: Self::name().to_string(),
                value: value.to_string(),
            })
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
pub enum Person {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
}

impl FeatureValue for Person {
    fn name() -> &'static str {
        PERSON
    }

    fn all() -> &'static [Self] {
        &[Person::First, Person::Second, Person::Third]
    }

    fn value(self) -> &'static str {
        match self {
            Person::First => "1",
            Person::Second => "2",
            Person::Third => "3",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
pub enum Number {
    #[serde(rename = "Sing")]
    Singular,
    #[serde(rename = "Plur")]
    Plural,
}

impl FeatureValue for Number {
    fn name() -> &'static str {
        NUMBER
    }

    fn all() -> &'static [Self] {
        &[Number::Singular, Number::Plural]
    }

    fn value(self) -> &'static str {
        match self {
            Number::Singular => "Sing",
            Number::Plural => "Plur",
        }
    }
}

/// Indicative tenses. The past perfect (`am cântat`) and the future
/// (`voi cânta`) are compound forms; the others are single words.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
pub enum VerbTense {
    #[serde(rename = "Pres")]
    Present,
    PastPerfect,
    #[serde(rename = "Imp")]
    Imperfect,
    #[serde(rename = "Past")]
    PastSimple,
    Future,
}

impl VerbTense {
    pub fn is_compound(self) -> bool {
        matches!(self, VerbTense::PastPerfect | VerbTense::Future)
    }
}

impl FeatureValue for VerbTense {
    fn name() -> &'static str {
        TENSE
    }

    fn all() -> &'static [Self] {
        &[
            VerbTense::Present,
            VerbTense::PastPerfect,
            VerbTense::Imperfect,
            VerbTense::PastSimple,
            VerbTense::Future,
        ]
    }

    fn value(self) -> &'static str {
        match self {
            VerbTense::Present => "Pres",
            VerbTense::PastPerfect => "PastPerfect",
            VerbTense::Imperfect => "Imp",
            VerbTense::PastSimple => "Past",
            VerbTense::Future => "Future",
        }
    }
}

macro_rules! feature_value_str {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.value())
            }
        }

        impl FromStr for $ty {
            type Err = MorphError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_value(s)
            }
        }
    )*};
}

feature_value_str!(Person, Number, VerbTense);

/// The feature request for one indicative form.
pub fn indicative_features(lemma: &str, tense: VerbTense, person: Person, number: Number) -> Features {
    let mut features = Features::from([
        (LEMMA.to_string(), lemma.to_string()),
        (CATEGORY.to_string(), "V".to_string()),
        (TYPE.to_string(), "Main".to_string()),
        (MOOD.to_string(), "Ind".to_string()),
        (PERSON.to_string(), person.value().to_string()),
        (NUMBER.to_string(), number.value().to_string()),
    ]);
    let key = if tense.is_compound() { SYNTH_FORM } else { TENSE };
    features.insert(key.to_string(), tense.value().to_string());
    features
}

/// Best form of each word of the indicative `tense` of `lemma`.
pub fn indicative_forms(
    engine: &MorphEngine,
    lemma: &str,
    tense: VerbTense,
    person: Person,
    number: Number,
) -> Result<Vec<String>> {
    engine.generate_best_form(&indicative_features(lemma, tense, person, number))
}

/// All six persons of `tense`, singular first.
pub fn indicative_paradigm(
    engine: &MorphEngine,
    lemma: &str,
    tense: VerbTense,
) -> Result<Vec<(Person, Number, Vec<String>)>> {
    let mut paradigm = Vec::with_capacity(Person::all().len() * Number::all().len());
    for &number in Number::all() {
        for &person in Person::all() {
            let forms = indicative_forms(engine, lemma, tense, person, number)?;
            paradigm.push((person, number, forms));
        }
    }
    Ok(paradigm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        assert_eq!("2".parse::<Person>().unwrap(), Person::Second);
        assert_eq!("Plur".parse::<Number>().unwrap(), Number::Plural);
        assert_eq!("Imp".parse::<VerbTense>().unwrap(), VerbTense::Imperfect);
        assert_eq!(VerbTense::PastSimple.to_string(), "Past");
        assert!(matches!(
            "Aorist".parse::<VerbTense>(),
            Err(MorphError::UnknownFeatureValue { feature, .. }) if feature == "Tense"
        ));
    }

    #[test]
    fn test_serde_matches_tag_spelling() {
        assert_eq!(serde_json::to_string(&Person::First).unwrap(), "\"1\"");
        let tense: VerbTense = serde_json::from_str("\"PastPerfect\"").unwrap();
        assert_eq!(tense, VerbTense::PastPerfect);
        for &tense in VerbTense::all() {
            assert_eq!(
                serde_json::to_string(&tense).unwrap(),
                format!("\"{}\"", tense.value())
            );
        }
    }

    #[test]
    fn test_compound_tenses_use_synth_form() {
        let simple = indicative_features("cânta", VerbTense::Imperfect, Person::Third, Number::Plural);
        assert_eq!(simple["Tense"], "Imp");
        assert!(!simple.contains_key("SynthForm"));

        let compound = indicative_features("cânta", VerbTense::Future, Person::First, Number::Singular);
        assert_eq!(compound["SynthForm"], "Future");
        assert!(!compound.contains_key("Tense"));
        assert_eq!(compound["Person"], "1");
    }
}
