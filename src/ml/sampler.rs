// ============================================================
// Layer 5 — Greedy Autoregressive Sampler
// ============================================================
// 1. Encode the seed and run it through the model in one pass
// 2. Take the scores at the last position, pick the argmax
// 3. Append that character, feed only the new code back in,
//    carrying the recurrent state forward
// 4. Stop after exactly `length` characters
//
// No temperature, no beam, no end token: the same model and
// seed always produce the same text.

use burn::prelude::*;

use crate::data::vocab::Vocabulary;
use crate::domain::error::{PoetryError, Result};
use crate::ml::model::CharRnnModel;

pub struct GreedySampler<'a, B: Backend> {
    model: &'a CharRnnModel<B>,
    vocab: &'a Vocabulary,
}

impl<'a, B: Backend> GreedySampler<'a, B> {
    pub fn new(model: &'a CharRnnModel<B>, vocab: &'a Vocabulary) -> Result<Self> {
        if model.vocab_size != vocab.len() {
            return Err(PoetryError::shape(
                "sampler vocabulary",
                &[model.vocab_size],
                &[vocab.len()],
            ));
        }
        Ok(Self { model, vocab })
    }

    /// Returns `seed` followed by `length` generated characters.
    pub fn generate(&self, seed: &str, length: usize) -> Result<String> {
        let seed_codes = self.vocab.encode(seed)?;
        if length == 0 {
            return Ok(seed.to_string());
        }
        if seed_codes.is_empty() {
            return Err(PoetryError::EmptySeed);
        }

        let device = self.model.device();
        let vocab_size = self.model.vocab_size;
        let mut state = self.model.init_state(1);
        let mut step  = seed_codes;
        let mut text  = seed.to_string();

        for _ in 0..length {
            let seq_len = step.len();
            let flat: Vec<i32> = step.iter().map(|&c| c as i32).collect();
            let inputs = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &device)
                .reshape([1, seq_len]);

            let (logits, next_state) = self.model.forward(inputs, state)?;
            state = next_state;

            let last = logits
                .slice([0..1, seq_len - 1..seq_len, 0..vocab_size])
                .reshape([vocab_size]);
            let code = last.argmax(0).into_scalar().elem::<i64>() as usize;

            text.push(self.vocab.char_of(code)?);
            step = vec![code];
        }

        tracing::debug!("Generated {} chars from seed {:?}", length, seed);
        Ok(text)
    }
}
