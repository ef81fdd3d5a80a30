// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads a UTF-8 text file with one poem per line.
//
// A missing, unreadable or non-UTF-8 file, and a file with no
// non-empty lines, all surface as PoetryError::Corpus.

use anyhow::Result;
use std::{fs, path::PathBuf};

use crate::domain::corpus::Corpus;
use crate::domain::error::PoetryError;
use crate::domain::traits::CorpusSource;

pub struct TextCorpusLoader {
    path: PathBuf,
}

impl TextCorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusSource for TextCorpusLoader {
    fn load(&self) -> Result<Corpus> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            PoetryError::Corpus(format!("cannot read '{}': {e}", self.path.display()))
        })?;

        let corpus = Corpus::from_text(&text).map_err(|e| match e {
            PoetryError::Corpus(msg) => {
                PoetryError::Corpus(format!("'{}': {msg}", self.path.display()))
            }
            other => other,
        })?;

        tracing::info!(
            "Loaded {} poems ({} chars) from '{}'",
            corpus.len(),
            corpus.chars().count(),
            self.path.display()
        );
        Ok(corpus)
    }
}
