// ============================================================
// Layer 4 — Character Vocabulary
// ============================================================
// A bijection between the distinct characters of the corpus and
// dense integer codes 0..V.
//
// Codes follow the sorted order of the character set, so the
// mapping depends only on which characters occur, never on how
// often or where they first appear:
//
//   corpus "abac\nbc"  →  { a:0, b:1, c:2 }

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;

use crate::domain::corpus::Corpus;
use crate::domain::error::{PoetryError, Result};
use crate::domain::traits::Persistable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    itos: Vec<char>,
    stoi: HashMap<char, usize>,
}

/// On-disk form: the ordered character list only
#[derive(Serialize, Deserialize)]
struct VocabFile {
    chars: Vec<char>,
}

impl Vocabulary {
    /// Build the vocabulary from every character in the corpus.
    pub fn build(corpus: &Corpus) -> Result<Self> {
        Self::from_chars(corpus.chars())
    }

    /// Build from an arbitrary character stream; fails when it is empty.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Result<Self> {
        let distinct: BTreeSet<char> = chars.into_iter().collect();
        if distinct.is_empty() {
            return Err(PoetryError::Corpus(
                "cannot build a vocabulary from an empty corpus".into(),
            ));
        }
        let itos: Vec<char> = distinct.into_iter().collect();
        Ok(Self::from_sorted(itos))
    }

    /// Restore a vocabulary from its ordered character list.
    /// The list must be strictly increasing (sorted, no duplicates).
    pub fn from_ordered(itos: Vec<char>) -> Result<Self> {
        if itos.is_empty() {
            return Err(PoetryError::Corpus("vocabulary list is empty".into()));
        }
        if itos.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PoetryError::Corpus(
                "vocabulary list is not strictly sorted".into(),
            ));
        }
        Ok(Self::from_sorted(itos))
    }

    fn from_sorted(itos: Vec<char>) -> Self {
        let stoi = itos.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { itos, stoi }
    }

    /// Vocabulary size V
    pub fn len(&self) -> usize {
        self.itos.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.itos
    }

    pub fn code_of(&self, ch: char) -> Result<usize> {
        self.stoi
            .get(&ch)
            .copied()
            .ok_or(PoetryError::VocabularyLookup { ch })
    }

    pub fn char_of(&self, code: usize) -> Result<char> {
        self.itos.get(code).copied().ok_or(PoetryError::UnknownCode {
            code,
            size: self.itos.len(),
        })
    }

    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        text.chars().map(|c| self.code_of(c)).collect()
    }

    pub fn decode(&self, codes: &[usize]) -> Result<String> {
        codes.iter().map(|&c| self.char_of(c)).collect()
    }
}

impl Persistable for Vocabulary {
    fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string(&VocabFile { chars: self.itos.clone() })?;
        fs::write(path, json).with_context(|| format!("Cannot write vocabulary to '{path}'"))?;
        tracing::debug!("Saved vocabulary ({} chars) to '{}'", self.len(), path);
        Ok(())
    }

    fn load(path: &str) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read vocabulary from '{path}'"))?;
        let file: VocabFile = serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary file '{path}'"))?;
        Ok(Self::from_ordered(file.chars)?)
    }
}
