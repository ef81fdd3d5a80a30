// ============================================================
// Layer 3 — Corpus Domain Type
// ============================================================
// An ordered list of poems, one per line, loaded once and
// never mutated for the rest of the run.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PoetryError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    lines: Vec<String>,
}

impl Corpus {
    /// Split raw file contents into poem lines.
    ///
    /// Lines are separated by `'\n'`; a trailing `'\r'` is dropped so
    /// files saved with Windows line endings do not leak `'\r'` into
    /// the vocabulary. Blank lines are skipped.
    pub fn from_text(text: &str) -> Result<Self> {
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if lines.is_empty() {
            return Err(PoetryError::Corpus("corpus contains no non-empty lines".into()));
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Never true for a corpus built by `from_text`
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over every character of every line, in corpus order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.lines.iter().flat_map(|line| line.chars())
    }

    /// First character of the first poem
    pub fn first_char(&self) -> Option<char> {
        self.chars().next()
    }
}
