use burn::data::dataset::Dataset;

use crate::domain::sample::CharSample;

/// All windows of the corpus, in indexer order.
/// Shuffling happens in the DataLoader, not here.
pub struct CharDataset {
    samples: Vec<CharSample>,
}

impl CharDataset {
    pub fn new(samples: Vec<CharSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<CharSample> for CharDataset {
    fn get(&self, index: usize) -> Option<CharSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
