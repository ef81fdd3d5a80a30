// ============================================================
// Layer 4 — Character Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<CharSample>
// into two Int tensors of shape [batch, L].
//
//   [s1_t1, ..., s1_tL, s2_t1, ..., sN_tL] → reshape [N, L]
//
// The batcher does not pad or truncate. Shape checks happen in
// the training loop before the forward pass.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sample::CharSample;

#[derive(Debug, Clone)]
pub struct CharBatch<B: Backend> {
    /// Input windows — shape: [batch_size, seq_len]
    pub inputs: Tensor<B, 2, Int>,

    /// Next-character targets — shape: [batch_size, seq_len]
    pub targets: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct CharBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> CharBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<CharSample, CharBatch<B>> for CharBatcher<B> {
    fn batch(&self, items: Vec<CharSample>) -> CharBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(CharSample::len).unwrap_or(0);

        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input.iter().map(|&c| c as i32))
            .collect();

        let target_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.target.iter().map(|&c| c as i32))
            .collect();

        let inputs = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(
            target_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        CharBatch { inputs, targets }
    }
}
