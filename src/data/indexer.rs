// ============================================================
// Layer 4 — Windowed Sequence Indexer
// ============================================================
// Slides a window of L+1 codes across each encoded line with
// stride 1 and splits every window into (input, target):
//
//   codes = [0, 1, 0, 2], L = 2
//   i=0: window [0,1,0] → input [0,1], target [1,0]
//   i=1: window [1,0,2] → input [1,0], target [0,2]
//
// A line of N codes yields max(0, N − L) samples. Lines with
// N ≤ L yield none; they are counted as degenerate so the data
// loss shows up in logs and in IndexStats.
//
// Output order: line order, then increasing start index.

use crate::domain::error::{PoetryError, Result};
use crate::domain::sample::CharSample;

/// Bookkeeping for one indexing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub lines:            usize,
    /// Lines too short to produce a single window
    pub degenerate_lines: usize,
    pub samples:          usize,
}

#[derive(Debug, Clone, Copy)]
pub struct WindowIndexer {
    seq_len: usize,
}

impl WindowIndexer {
    pub fn new(seq_len: usize) -> Result<Self> {
        if seq_len == 0 {
            return Err(PoetryError::InvalidConfig("sequence length must be at least 1".into()));
        }
        Ok(Self { seq_len })
    }

    /// Number of samples a line of `n` codes produces
    pub fn samples_for(&self, n: usize) -> usize {
        n.saturating_sub(self.seq_len)
    }

    /// All windows of one encoded line, in start-index order.
    pub fn index_line<'a>(&self, codes: &'a [usize]) -> impl Iterator<Item = CharSample> + 'a {
        let l = self.seq_len;
        codes
            .windows(l + 1)
            .map(move |w| CharSample::new(w[..l].to_vec(), w[1..].to_vec()))
    }

    /// Index every line and report how many were too short.
    pub fn index(&self, lines: &[Vec<usize>]) -> (Vec<CharSample>, IndexStats) {
        let mut samples = Vec::new();
        let mut stats   = IndexStats { lines: lines.len(), ..IndexStats::default() };

        for codes in lines {
            if self.samples_for(codes.len()) == 0 {
                stats.degenerate_lines += 1;
                continue;
            }
            samples.extend(self.index_line(codes));
        }
        stats.samples = samples.len();

        if stats.degenerate_lines > 0 {
            tracing::warn!(
                "{} of {} lines are shorter than seq_len + 1 = {} and contribute no samples",
                stats.degenerate_lines,
                stats.lines,
                self.seq_len + 1
            );
        }
        tracing::info!("Indexed {} samples from {} lines", stats.samples, stats.lines);

        (samples, stats)
    }
}
