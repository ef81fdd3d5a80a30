// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From the raw text file to tensor batches:
//
//   poems.txt
//       │
//       ▼
//   TextCorpusLoader  → reads the file, one poem per line
//       │
//       ▼
//   Vocabulary        → sorted character set ↔ codes 0..V
//       │
//       ▼
//   WindowIndexer     → (input, target) windows of length L
//       │
//       ▼
//   CharDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   CharBatcher       → stacks samples into [batch, L] tensors
//       │
//       ▼
//   DataLoader        → shuffled mini-batches for the trainer

/// Reads the poem corpus from a text file
pub mod loader;

/// Character ↔ code bijection
pub mod vocab;

/// Sliding-window sample extraction
pub mod indexer;

/// Implements Burn's Dataset trait for character samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
