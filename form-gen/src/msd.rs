//! Positional morphosyntactic descriptions (MSD tags).
//!
//! A tag such as `Vmip1s` is a class code (`V`, verb) followed by one
//! character per feature slot of that class. `-` means "unspecified".
//! See <https://nl.ijs.si/ME/V6/msd/html/msd-ro.html> for the Romanian inventory.

use std::collections::BTreeMap;

use crate::error::{MorphError, Result};
use crate::{CATEGORY, Features};

/// Wildcard character used for unspecified slots.
pub const ANY: char = '-';

/// One feature of a tag class: a name and its single-character value codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphFeature {
    name: String,
    values: Vec<(char, String)>,
    default: char,
    omit_default: bool,
}

impl MorphFeature {
    pub fn new(name: &str, values: &[(char, &str)], default: char) -> Result<Self> {
        let invalid = |reason: String| MorphError::InvalidFeatureDefinition {
            feature: name.to_string(),
            reason,
        };
        if values.iter().any(|(code, _)| *code == ANY) {
            return Err(invalid(format!("{ANY:?} is reserved for unspecified slots")));
        }
        for (i, (code, _)) in values.iter().enumerate() {
            if values[..i].iter().any(|(other, _)| other == code) {
                return Err(invalid(format!("code {code:?} declared twice")));
            }
        }
        if !values.iter().any(|(code, _)| *code == default) {
            return Err(invalid(format!("default {default:?} is not a declared code")));
        }
        Ok(Self {
            name: name.to_string(),
            values: values
                .iter()
                .map(|(code, value)| (*code, value.to_string()))
                .collect(),
            default,
            omit_default: false,
        })
    }

    /// Encode the default value as [`ANY`] instead of its code.
    pub fn omitting_default(mut self) -> Self {
        self.omit_default = true;
        self
    }

    /// A copy of this feature under a different default, with `other`'s codes added.
    pub fn merged_with(&self, other: &MorphFeature, default: char) -> Result<Self> {
        let mut values: Vec<(char, &str)> = self
            .values
            .iter()
            .map(|(code, value)| (*code, value.as_str()))
            .collect();
        for (code, value) in &other.values {
            if !values.iter().any(|(c, _)| c == code) {
                values.push((*code, value.as_str()));
            }
        }
        let merged = MorphFeature::new(&self.name, &values, default)?;
        Ok(if self.omit_default {
            merged.omitting_default()
        } else {
            merged
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_code(&self) -> char {
        self.default
    }

    pub fn value_of(&self, code: char) -> Option<&str> {
        self.values
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, value)| value.as_str())
    }

    pub fn code_of(&self, value: &str) -> Option<char> {
        self.values
            .iter()
            .find(|(_, v)| v == value)
            .map(|(code, _)| *code)
    }

    pub fn values(&self) -> impl Iterator<Item = (char, &str)> {
        self.values.iter().map(|(code, value)| (*code, value.as_str()))
    }
}

/// A part-of-speech class: its code and its ordered feature slots.
///
/// A `None` slot is unconstrained: whatever character sits at that position
/// is ignored when decoding and it always encodes as [`ANY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphClass {
    code: char,
    slots: Vec<Option<MorphFeature>>,
}

impl MorphClass {
    pub fn new(code: char, slots: Vec<Option<MorphFeature>>) -> Self {
        Self { code, slots }
    }

    pub fn code(&self) -> char {
        self.code
    }

    pub fn slots(&self) -> &[Option<MorphFeature>] {
        &self.slots
    }

    /// Encode the features this class declares; undeclared keys are ignored.
    pub fn tag_from_features(&self, features: &Features) -> Result<String> {
        let mut tag = String::with_capacity(self.slots.len() + 1);
        tag.push(self.code);
        for slot in &self.slots {
            let Some(feature) = slot else {
                tag.push(ANY);
                continue;
            };
            let Some(value) = features.get(feature.name()) else {
                tag.push(ANY);
                continue;
            };
            let code = feature
                .code_of(value)
                .ok_or_else(|| MorphError::UnknownFeatureValue {
                    feature: feature.name().to_string(),
                    value: value.clone(),
                })?;
            if feature.omit_default && code == feature.default {
                tag.push(ANY);
            } else {
                tag.push(code);
            }
        }
        let trimmed = tag.trim_end_matches(ANY).len();
        tag.truncate(trimmed);
        Ok(tag)
    }

    /// Decode a tag of this class. The tag must already be normalized.
    pub fn features_from_tag(&self, tag: &str) -> Result<Features> {
        let mut chars = tag.chars();
        if chars.next() != Some(self.code) {
            return Err(MorphError::UnknownCategory {
                tag: tag.to_string(),
            });
        }
        let len = chars.clone().count();
        if len > self.slots.len() {
            return Err(MorphError::TagTooLong {
                tag: tag.to_string(),
                category: self.code,
                len,
                max: self.slots.len(),
            });
        }

        let mut features = Features::new();
        features.insert(CATEGORY.to_string(), self.code.to_string());
        for (slot, code) in self.slots.iter().zip(chars) {
            if code == ANY {
                continue;
            }
            let Some(feature) = slot else {
                continue;
            };
            let value = feature
                .value_of(code)
                .ok_or_else(|| MorphError::UnknownValueCode {
                    tag: tag.to_string(),
                    feature: feature.name().to_string(),
                    code,
                })?;
            features.insert(feature.name().to_string(), value.to_string());
        }
        Ok(features)
    }
}

/// Exact corrections for tags known to be malformed in a given corpus.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
)]
#[serde(transparent)]
pub struct TagNormalization(BTreeMap<String, String>);

impl TagNormalization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, malformed: &str, corrected: &str) {
        self.0.insert(malformed.to_string(), corrected.to_string());
    }

    pub fn apply<'a>(&'a self, tag: &'a str) -> &'a str {
        self.0.get(tag).map(String::as_str).unwrap_or(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for TagNormalization {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// All tag classes of a language, keyed by class code.
#[derive(Debug, Clone, Default)]
pub struct TagDictionary {
    classes: BTreeMap<char, MorphClass>,
}

impl TagDictionary {
    pub fn new(classes: impl IntoIterator<Item = MorphClass>) -> Self {
        Self {
            classes: classes.into_iter().map(|c| (c.code(), c)).collect(),
        }
    }

    pub fn class(&self, code: char) -> Option<&MorphClass> {
        self.classes.get(&code)
    }

    pub fn classes(&self) -> impl Iterator<Item = &MorphClass> {
        self.classes.values()
    }

    pub fn features_from_tag(
        &self,
        tag: &str,
        normalization: Option<&TagNormalization>,
    ) -> Result<Features> {
        let tag = match normalization {
            Some(table) => table.apply(tag),
            None => tag,
        };
        let class = tag
            .chars()
            .next()
            .and_then(|code| self.class(code))
            .ok_or_else(|| MorphError::UnknownCategory {
                tag: tag.to_string(),
            })?;
        class.features_from_tag(tag)
    }

    /// Encode a feature map, dispatching on its `category` entry.
    pub fn tag_from_features(&self, features: &Features) -> Result<String> {
        let category = features
            .get(CATEGORY)
            .ok_or_else(|| MorphError::MissingFeature(CATEGORY.to_string()))?;
        let mut codes = category.chars();
        let class = match (codes.next(), codes.next()) {
            (Some(code), None) => self.class(code),
            _ => None,
        }
        .ok_or_else(|| MorphError::UnknownCategory {
            tag: category.clone(),
        })?;
        class.tag_from_features(features)
    }
}
