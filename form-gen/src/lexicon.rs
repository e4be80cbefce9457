//! The lexical inventory: every known (form, lemma, tag) triple with a usage count.

use std::cmp::Reverse;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{InflectionMiss, MorphError, Result};
use crate::msd::ANY;

/// Decides whether a candidate may be returned for a query tag.
pub type EntryFilter = dyn Fn(&LexiconEntry, &str) -> bool + Send + Sync;

/// Persisted form of a lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LexiconRecord {
    pub form: String,
    pub lemma: String,
    #[serde(alias = "xpos")]
    pub tag: String,
    #[serde(default, alias = "count")]
    pub usage_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    form: String,
    lemma: String,
    tag: String,
    negated: bool,
    usage_count: u32,
}

impl LexiconEntry {
    pub fn form(&self) -> &str {
        &self.form
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The form carries a negative prefix its lemma lacks (`nemâncat` from `mânca`).
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }
}

/// Prefix test used to flag negated homographs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct NegationHeuristic {
    pub prefix: String,
    /// Characters after the prefix compared against the start of the lemma.
    pub match_len: usize,
}

impl Default for NegationHeuristic {
    fn default() -> Self {
        Self {
            prefix: "ne".to_string(),
            match_len: 3,
        }
    }
}

impl NegationHeuristic {
    pub fn is_negated(&self, form: &str, lemma: &str) -> bool {
        let Some(rest) = form.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        if !lemma.starts_with(self.prefix.as_str()) {
            return true;
        }
        // lemma is itself ne-initial: only a doubled prefix counts
        rest.chars()
            .take(self.match_len)
            .eq(lemma.chars().take(self.match_len))
    }
}

/// Number of positions where both tags carry the same non-wildcard code,
/// or 0 as soon as one position conflicts.
pub fn tag_match_score(a: &str, b: &str) -> usize {
    let mut score = 0;
    for (x, y) in a.chars().zip(b.chars()) {
        if x == ANY || y == ANY {
            continue;
        }
        if x != y {
            return 0;
        }
        score += 1;
    }
    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    by_form: FxHashMap<String, Vec<EntryId>>,
    by_lemma: FxHashMap<String, IndexMap<String, Vec<EntryId>>>,
}

impl Lexicon {
    pub fn from_records(
        records: impl IntoIterator<Item = LexiconRecord>,
        negation: &NegationHeuristic,
    ) -> Result<Self> {
        let mut lexicon = Lexicon::default();
        for (i, record) in records.into_iter().enumerate() {
            for (field, value) in [
                ("form", &record.form),
                ("lemma", &record.lemma),
                ("tag", &record.tag),
            ] {
                if value.is_empty() {
                    return Err(MorphError::MalformedLexiconRecord {
                        line: i + 1,
                        reason: format!("empty {field}"),
                    });
                }
            }
            lexicon.push(record, negation);
        }

        let entries = &lexicon.entries;
        for bucket in lexicon.by_form.values_mut() {
            sort_bucket(entries, bucket);
        }
        for by_tag in lexicon.by_lemma.values_mut() {
            for bucket in by_tag.values_mut() {
                sort_bucket(entries, bucket);
            }
        }
        Ok(lexicon)
    }

    fn push(&mut self, record: LexiconRecord, negation: &NegationHeuristic) {
        let id = EntryId(self.entries.len());
        self.by_form.entry(record.form.clone()).or_default().push(id);
        self.by_lemma
            .entry(record.lemma.clone())
            .or_default()
            .entry(record.tag.clone())
            .or_default()
            .push(id);
        self.entries.push(LexiconEntry {
            negated: negation.is_negated(&record.form, &record.lemma),
            form: record.form,
            lemma: record.lemma,
            tag: record.tag,
            usage_count: record.usage_count,
        });
    }

    pub fn records(&self) -> impl Iterator<Item = LexiconRecord> + '_ {
        self.entries.iter().map(|entry| LexiconRecord {
            form: entry.form.clone(),
            lemma: entry.lemma.clone(),
            tag: entry.tag.clone(),
            usage_count: entry.usage_count,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> &LexiconEntry {
        &self.entries[id.0]
    }

    /// Entries spelled `form`, most used first.
    pub fn entries_for_form(&self, form: &str) -> impl Iterator<Item = &LexiconEntry> {
        self.by_form
            .get(form)
            .into_iter()
            .flatten()
            .map(|id| self.get(*id))
    }

    /// Inflections of `lemma` compatible with `query_tag`, best first.
    ///
    /// Ranked by match score, then by shorter tag, then by usage count.
    pub fn rank_by_lemma(
        &self,
        lemma: &str,
        query_tag: &str,
        filter: Option<&EntryFilter>,
    ) -> Result<Vec<&LexiconEntry>> {
        let by_tag = self
            .by_lemma
            .get(lemma)
            .ok_or_else(|| MorphError::LemmaNotFound(lemma.to_string()))?;

        let mut ranked: Vec<(usize, &LexiconEntry)> = by_tag
            .iter()
            .flat_map(|(tag, ids)| {
                let score = tag_match_score(tag, query_tag);
                ids.iter().map(move |id| (score, self.get(*id)))
            })
            .filter(|(score, _)| *score > 0)
            .collect();
        ranked.sort_by_key(|(score, entry)| {
            (
                Reverse(*score),
                entry.tag.chars().count(),
                Reverse(entry.usage_count),
            )
        });

        let miss = |reason| MorphError::NoMatchingInflection {
            lemma: lemma.to_string(),
            tag: query_tag.to_string(),
            reason,
        };
        if ranked.is_empty() {
            return Err(miss(InflectionMiss::NoCompatibleTag));
        }

        let candidates = ranked.len();
        let ranked: Vec<&LexiconEntry> = ranked
            .into_iter()
            .map(|(_, entry)| entry)
            .filter(|entry| filter.is_none_or(|keep| keep(*entry, query_tag)))
            .collect();
        log::debug!(
            "{lemma} {query_tag}: {} of {candidates} candidates kept",
            ranked.len()
        );
        if ranked.is_empty() {
            return Err(miss(InflectionMiss::FilteredOut));
        }
        Ok(ranked)
    }

    pub fn lookup_by_lemma(
        &self,
        lemma: &str,
        query_tag: &str,
        filter: Option<&EntryFilter>,
    ) -> Result<Vec<String>> {
        Ok(self
            .rank_by_lemma(lemma, query_tag, filter)?
            .into_iter()
            .map(|entry| entry.form.clone())
            .collect())
    }

    /// Record that `form` was used, optionally only as `lemma` and `tag`.
    ///
    /// Returns whether any entry was updated.
    pub fn confirm(&mut self, form: &str, lemma: Option<&str>, tag: Option<&str>) -> bool {
        let Some(ids) = self.by_form.get(form) else {
            return false;
        };
        let hits: Vec<EntryId> = ids
            .iter()
            .copied()
            .filter(|id| {
                let entry = &self.entries[id.0];
                lemma.is_none_or(|l| entry.lemma == l) && tag.is_none_or(|t| entry.tag == t)
            })
            .collect();
        if hits.is_empty() {
            return false;
        }

        for id in &hits {
            let entry = &mut self.entries[id.0];
            entry.usage_count = entry.usage_count.saturating_add(1);
        }

        let entries = &self.entries;
        if let Some(bucket) = self.by_form.get_mut(form) {
            sort_bucket(entries, bucket);
        }
        for id in &hits {
            let entry = &entries[id.0];
            if let Some(bucket) = self
                .by_lemma
                .get_mut(&entry.lemma)
                .and_then(|by_tag| by_tag.get_mut(&entry.tag))
            {
                sort_bucket(entries, bucket);
            }
        }
        true
    }

    pub fn read_json(reader: impl Read, negation: &NegationHeuristic) -> Result<Self> {
        let records: Vec<LexiconRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records, negation)
    }

    pub fn write_json(&self, writer: impl Write) -> Result<()> {
        let records: Vec<LexiconRecord> = self.records().collect();
        serde_json::to_writer(writer, &records)?;
        Ok(())
    }

    /// Parse `form<TAB>lemma<TAB>tag` lines. A lemma of `=` repeats the form.
    /// Columns after the tag are ignored.
    pub fn read_tsv(reader: impl BufRead, negation: &NegationHeuristic) -> Result<Self> {
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = |reason: String| MorphError::MalformedLexiconRecord {
                line: i + 1,
                reason,
            };
            let fields: Vec<&str> = line.split('\t').collect();
            let [form, lemma, tag, ..] = fields[..] else {
                return Err(malformed(format!(
                    "expected at least 3 tab-separated fields, found {}",
                    fields.len()
                )));
            };
            if form.is_empty() || lemma.is_empty() || tag.is_empty() {
                return Err(malformed("empty field".to_string()));
            }
            let lemma = if lemma == "=" { form } else { lemma };
            records.push(LexiconRecord {
                form: form.to_string(),
                lemma: lemma.to_string(),
                tag: tag.to_string(),
                usage_count: 0,
            });
        }
        Self::from_records(records, negation)
    }

    pub fn load_json(path: impl AsRef<Path>, negation: &NegationHeuristic) -> Result<Self> {
        let path = path.as_ref();
        let lexicon = Self::read_json(BufReader::new(File::open(path)?), negation)?;
        log::info!("Loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    pub fn load_tsv(path: impl AsRef<Path>, negation: &NegationHeuristic) -> Result<Self> {
        let path = path.as_ref();
        let lexicon = Self::read_tsv(BufReader::new(File::open(path)?), negation)?;
        log::info!("Loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        log::info!("Saved {} lexicon entries to {}", self.len(), path.display());
        Ok(())
    }
}

fn sort_bucket(entries: &[LexiconEntry], bucket: &mut [EntryId]) {
    bucket.sort_by_key(|id| Reverse(entries[id.0].usage_count));
}

/// A lexicon shared between threads; confirmations take the write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedLexicon(Arc<RwLock<Lexicon>>);

impl SharedLexicon {
    pub fn new(lexicon: Lexicon) -> Self {
        Self(Arc::new(RwLock::new(lexicon)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Lexicon> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn confirm(&self, form: &str, lemma: Option<&str>, tag: Option<&str>) -> bool {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .confirm(form, lemma, tag)
    }
}
