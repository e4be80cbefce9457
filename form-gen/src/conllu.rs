//! Just enough CoNLL-U to feed annotated sentences to the extractor.

use std::collections::BTreeMap;

use crate::error::{MorphError, Result};
use crate::extractor::TreeNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub id: usize,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: BTreeMap<String, String>,
    /// 0 for the root.
    pub head: usize,
    pub deprel: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    sent_id: String,
    text: Option<String>,
    words: Vec<Word>,
}

impl Sentence {
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
        Self::from_lines(&lines, "1")
    }

    fn from_lines(lines: &[(usize, &str)], fallback_id: &str) -> Result<Self> {
        let mut sent_id = None;
        let mut text = None;
        let mut words = Vec::new();
        for &(line_no, line) in lines {
            let malformed = |reason: String| MorphError::MalformedConllu {
                line: line_no,
                reason,
            };
            if let Some(comment) = line.strip_prefix('#') {
                if let Some((key, value)) = comment.split_once('=') {
                    match key.trim() {
                        "sent_id" => sent_id = Some(value.trim().to_string()),
                        "text" => text = Some(value.trim().to_string()),
                        _ => {}
                    }
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let columns: Vec<&str> = line.split('\t').collect();
            let [id, form, lemma, upos, xpos, feats, head, deprel, _deps, _misc] = columns[..]
            else {
                return Err(malformed(format!("expected 10 columns, found {}", columns.len())));
            };
            // multiword ranges and empty nodes
            if id.contains('-') || id.contains('.') {
                continue;
            }
            let id: usize = id
                .parse()
                .map_err(|_| malformed(format!("bad word id {id:?}")))?;
            if id != words.len() + 1 {
                return Err(malformed(format!("word id {id} out of sequence")));
            }
            let head: usize = head
                .parse()
                .map_err(|_| malformed(format!("bad head {head:?}")))?;
            words.push(Word {
                id,
                form: form.to_string(),
                lemma: lemma.to_string(),
                upos: upos.to_string(),
                xpos: xpos.to_string(),
                feats: parse_feats(feats).map_err(malformed)?,
                head,
                deprel: deprel.to_string(),
            });
        }

        if let Some(word) = words.iter().find(|w| w.head > words.len()) {
            return Err(MorphError::MalformedConllu {
                line: lines.first().map(|(n, _)| *n).unwrap_or(0),
                reason: format!("word {} points at missing head {}", word.id, word.head),
            });
        }
        Ok(Self {
            sent_id: sent_id.unwrap_or_else(|| fallback_id.to_string()),
            text,
            words,
        })
    }

    pub fn sent_id(&self) -> &str {
        &self.sent_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn node(&self, id: usize) -> Option<NodeRef<'_>> {
        let index = id.checked_sub(1).filter(|i| *i < self.words.len())?;
        Some(NodeRef {
            sentence: self,
            index,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.words.len()).map(move |index| NodeRef {
            sentence: self,
            index,
        })
    }
}

fn parse_feats(feats: &str) -> std::result::Result<BTreeMap<String, String>, String> {
    if feats == "_" {
        return Ok(BTreeMap::new());
    }
    feats
        .split('|')
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("bad feature {pair:?}"))
        })
        .collect()
}

/// Sentences separated by blank lines. Sentences without a `sent_id`
/// are numbered from 1.
pub fn parse_document(text: &str) -> Result<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut block: Vec<(usize, &str)> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                let fallback = (sentences.len() + 1).to_string();
                sentences.push(Sentence::from_lines(&block, &fallback)?);
                block.clear();
            }
        } else {
            block.push((i + 1, line));
        }
    }
    if !block.is_empty() {
        let fallback = (sentences.len() + 1).to_string();
        sentences.push(Sentence::from_lines(&block, &fallback)?);
    }
    Ok(sentences)
}

#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    sentence: &'a Sentence,
    index: usize,
}

impl<'a> NodeRef<'a> {
    pub fn word(&self) -> &'a Word {
        &self.sentence.words[self.index]
    }

    pub fn form(&self) -> &'a str {
        &self.word().form
    }
}

impl TreeNode for NodeRef<'_> {
    fn uid(&self) -> String {
        format!("{}/{}", self.sentence.sent_id, self.word().id)
    }

    fn upos(&self) -> &str {
        &self.word().upos
    }

    fn lemma(&self) -> &str {
        &self.word().lemma
    }

    fn xpos(&self) -> &str {
        &self.word().xpos
    }

    fn deprel(&self) -> &str {
        &self.word().deprel
    }

    fn feature(&self, name: &str) -> Option<&str> {
        self.word().feats.get(name).map(String::as_str)
    }

    fn parent(&self) -> Option<Self> {
        match self.word().head {
            0 => None,
            head => self.sentence.node(head),
        }
    }

    fn children(&self) -> Vec<Self> {
        let id = self.word().id;
        self.sentence
            .nodes()
            .filter(|node| node.word().head == id)
            .collect()
    }
}
