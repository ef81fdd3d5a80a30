use burn::{
    nn::{
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::domain::error::{self, PoetryError};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct CharRnnConfig {
    pub vocab_size: usize,
    pub embed_dim:  usize,
    pub hidden_dim: usize,
    #[config(default = 1)]
    pub num_layers: usize,
}

impl CharRnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CharRnnModel<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embed_dim).init(device);
        let layers: Vec<Lstm<B>> = (0..self.num_layers)
            .map(|i| {
                let d_input = if i == 0 { self.embed_dim } else { self.hidden_dim };
                LstmConfig::new(d_input, self.hidden_dim, true).init(device)
            })
            .collect();
        let output = LinearConfig::new(self.hidden_dim, self.vocab_size).init(device);
        CharRnnModel {
            embedding, layers, output,
            vocab_size: self.vocab_size,
            hidden_dim: self.hidden_dim,
        }
    }
}

// ─── RecurrentState ───────────────────────────────────────────────────────────
/// Hidden and cell state of every LSTM layer,
/// each shaped [num_layers, batch, hidden_dim].
///
/// Plain data between steps: the trainer detaches it at every
/// batch boundary so gradients never flow into a previous batch.
#[derive(Debug, Clone)]
pub struct RecurrentState<B: Backend> {
    pub hidden: Tensor<B, 3>,
    pub cell:   Tensor<B, 3>,
}

impl<B: Backend> RecurrentState<B> {
    pub fn zeros(num_layers: usize, batch_size: usize, hidden_dim: usize, device: &B::Device) -> Self {
        let shape = [num_layers, batch_size, hidden_dim];
        Self {
            hidden: Tensor::zeros(shape, device),
            cell:   Tensor::zeros(shape, device),
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.hidden.dims()
    }

    pub fn batch_size(&self) -> usize {
        self.dims()[1]
    }

    /// Keep the values, drop the autodiff history
    pub fn detach(self) -> Self {
        Self {
            hidden: self.hidden.detach(),
            cell:   self.cell.detach(),
        }
    }

    fn layer(&self, index: usize) -> LstmState<B, 2> {
        let [_, batch, hidden] = self.dims();
        let pick = |t: &Tensor<B, 3>| {
            t.clone()
                .slice([index..index + 1, 0..batch, 0..hidden])
                .squeeze::<2>(0)
        };
        LstmState { cell: pick(&self.cell), hidden: pick(&self.hidden) }
    }
}

// ─── CharRnnModel ─────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct CharRnnModel<B: Backend> {
    pub embedding:  Embedding<B>,
    pub layers:     Vec<Lstm<B>>,
    pub output:     Linear<B>,
    pub vocab_size: usize,
    pub hidden_dim: usize,
}

impl<B: Backend> CharRnnModel<B> {
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn device(&self) -> B::Device {
        self.output.weight.val().device()
    }

    /// Zero state for `batch_size` sequences
    pub fn init_state(&self, batch_size: usize) -> RecurrentState<B> {
        RecurrentState::zeros(self.num_layers(), batch_size, self.hidden_dim, &self.device())
    }

    /// inputs: [batch, seq_len] codes → logits: [batch, seq_len, vocab_size]
    pub fn forward(
        &self,
        inputs: Tensor<B, 2, Int>,
        state:  RecurrentState<B>,
    ) -> error::Result<(Tensor<B, 3>, RecurrentState<B>)> {
        let [batch_size, seq_len] = inputs.dims();
        if seq_len == 0 {
            return Err(PoetryError::shape("model inputs", &[batch_size, 1], &[batch_size, 0]));
        }
        let expected = [self.num_layers(), batch_size, self.hidden_dim];
        for got in [state.hidden.dims(), state.cell.dims()] {
            if got != expected {
                return Err(PoetryError::shape("recurrent state", &expected, &got));
            }
        }

        let mut x = self.embedding.forward(inputs); // [batch, seq_len, embed_dim]
        let mut hiddens = Vec::with_capacity(self.num_layers());
        let mut cells   = Vec::with_capacity(self.num_layers());

        for (i, layer) in self.layers.iter().enumerate() {
            let (out, next) = layer.forward(x, Some(state.layer(i)));
            hiddens.push(next.hidden);
            cells.push(next.cell);
            x = out; // [batch, seq_len, hidden_dim]
        }

        let logits = self.output.forward(x);
        let state  = RecurrentState {
            hidden: Tensor::stack::<3>(hiddens, 0),
            cell:   Tensor::stack::<3>(cells, 0),
        };
        Ok((logits, state))
    }
}

impl<B: AutodiffBackend> CharRnnModel<B> {
    /// Mean next-character cross-entropy over every batch position.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2, Int>,
        targets: Tensor<B, 2, Int>,
        state:   RecurrentState<B>,
    ) -> error::Result<(Tensor<B, 1>, RecurrentState<B>)> {
        let [batch_size, seq_len] = inputs.dims();
        let target_dims = targets.dims();
        if target_dims != [batch_size, seq_len] {
            return Err(PoetryError::shape("batch targets", &[batch_size, seq_len], &target_dims));
        }

        let (logits, state) = self.forward(inputs, state)?;

        let logits_dims = logits.dims();
        if logits_dims != [batch_size, seq_len, self.vocab_size] {
            return Err(PoetryError::shape(
                "model logits",
                &[batch_size, seq_len, self.vocab_size],
                &logits_dims,
            ));
        }

        let flat_logits  = logits.reshape([batch_size * seq_len, self.vocab_size]);
        let flat_targets = targets.reshape([batch_size * seq_len]);
        let ce = burn::nn::loss::CrossEntropyLossConfig::new()
            .init(&flat_logits.device());
        Ok((ce.forward(flat_logits, flat_targets), state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray;

    fn model<B: Backend>(num_layers: usize) -> CharRnnModel<B> {
        CharRnnConfig::new(5, 4, 6)
            .with_num_layers(num_layers)
            .init::<B>(&Default::default())
    }

    fn codes<B: Backend>(rows: [[i32; 3]; 2]) -> Tensor<B, 2, Int> {
        let flat: Vec<i32> = rows.iter().flatten().copied().collect();
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &Default::default()).reshape([2, 3])
    }

    #[test]
    fn test_config_serde_round_trip() {
        let cfg  = CharRnnConfig::new(7, 4, 6).with_num_layers(3);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: CharRnnConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.vocab_size, 7);
        assert_eq!(back.num_layers, 3);
    }

    #[test]
    fn test_forward_shapes() {
        let m = model::<TestBackend>(2);
        let state = m.init_state(2);
        assert_eq!(state.dims(), [2, 2, 6]);

        let (logits, next) = m.forward(codes([[0, 1, 2], [3, 4, 0]]), state).unwrap();
        assert_eq!(logits.dims(), [2, 3, 5]);
        assert_eq!(next.dims(), [2, 2, 6]);
        assert_eq!(next.cell.dims(), [2, 2, 6]);
    }

    #[test]
    fn test_state_batch_mismatch_is_rejected() {
        let m = model::<TestBackend>(1);
        let err = m.forward(codes([[0, 1, 2], [3, 4, 0]]), m.init_state(1)).unwrap_err();
        assert_eq!(err, PoetryError::shape("recurrent state", &[1, 2, 6], &[1, 1, 6]));
    }

    #[test]
    fn test_state_layer_mismatch_is_rejected() {
        let m = model::<TestBackend>(2);
        let state = RecurrentState::zeros(1, 2, 6, &Default::default());
        assert!(matches!(
            m.forward(codes([[0, 1, 2], [3, 4, 0]]), state),
            Err(PoetryError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_loss_is_finite_and_rejects_bad_targets() {
        let m = model::<Autodiff<TestBackend>>(1);
        let (loss, _) = m
            .forward_loss(codes([[0, 1, 2], [3, 4, 0]]), codes([[1, 2, 3], [4, 0, 1]]), m.init_state(2))
            .unwrap();
        let value: f64 = loss.into_scalar().elem::<f64>();
        assert!(value.is_finite() && value > 0.0);

        let short_targets = Tensor::<Autodiff<TestBackend>, 1, Int>::from_ints(
            [1, 2, 3, 4].as_slice(), &Default::default(),
        ).reshape([2, 2]);
        let err = m
            .forward_loss(codes([[0, 1, 2], [3, 4, 0]]), short_targets, m.init_state(2))
            .unwrap_err();
        assert_eq!(err, PoetryError::shape("batch targets", &[2, 3], &[2, 2]));
    }
}
