// ============================================================
// Layer 3 — Training Sample
// ============================================================
// One (input window, target window) pair cut from a single line.
// `target[i]` is the character that follows `input[i]` in the
// source line, so the target is the input shifted left by one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSample {
    pub input:  Vec<usize>,
    pub target: Vec<usize>,
}

impl CharSample {
    pub fn new(input: Vec<usize>, target: Vec<usize>) -> Self {
        Self { input, target }
    }

    /// Window length L
    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}
