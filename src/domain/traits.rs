// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, never to the
// concrete loader, generator or store behind them.

use anyhow::Result;
use crate::domain::corpus::Corpus;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Anything that can produce the poem corpus.
///
/// Implementations:
///   - TextCorpusLoader → one poem per line in a UTF-8 text file
pub trait CorpusSource {
    fn load(&self) -> Result<Corpus>;
}

// ─── TextGenerator ────────────────────────────────────────────────────────────
/// Anything that can continue a seed string.
///
/// Implementations:
///   - GenerateUseCase → greedy decoding with a saved model
pub trait TextGenerator {
    /// Return `seed` followed by exactly `length` generated characters.
    fn generate(&self, seed: &str, length: usize) -> Result<String>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// State that can be written to and restored from a single file.
///
/// Implementations:
///   - Vocabulary → ordered character list as JSON
pub trait Persistable: Sized {
    fn save(&self, path: &str) -> Result<()>;

    fn load(path: &str) -> Result<Self>;
}
