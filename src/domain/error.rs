// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Every failure the pipeline can raise on its own, as a typed enum.
// Application code wraps these in anyhow with extra context;
// tests match on the variants directly.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoetryError {
    /// Input file missing, unreadable, or with no usable lines
    #[error("corpus error: {0}")]
    Corpus(String),

    /// A seed character that never appeared in the training corpus
    #[error("character {ch:?} is not in the vocabulary")]
    VocabularyLookup { ch: char },

    #[error("code {code} is outside the vocabulary (size {size})")]
    UnknownCode { code: usize, size: usize },

    /// Tensor dimensions disagree with the configured model/batch shape
    #[error("shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        context:  String,
        expected: Vec<usize>,
        got:      Vec<usize>,
    },

    #[error("seed string is empty; at least one character is needed to start generation")]
    EmptySeed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PoetryError {
    pub fn shape(context: impl Into<String>, expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            context:  context.into(),
            expected: expected.to_vec(),
            got:      got.to_vec(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PoetryError>;
