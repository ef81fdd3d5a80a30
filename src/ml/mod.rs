// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn modules, optimisers and autodiff live in this layer.
//
//   model.rs    — Embedding → stacked LSTM → Linear, plus the
//                 explicit recurrent state carried between calls
//
//   trainer.rs  — Shuffled mini-batch loop with Adam, state
//                 detached at every batch boundary
//
//   sampler.rs  — Greedy autoregressive continuation of a seed
//
// Backend: ndarray (CPU) unless built with `--features wgpu`.

/// Character-level LSTM language model
pub mod model;

/// Training loop
pub mod trainer;

/// Greedy text generation
pub mod sampler;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;
