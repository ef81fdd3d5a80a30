// ============================================================
// Layer 2 — GenerateUseCase
// ============================================================
// Rebuilds a trained model from its artifact directory and
// continues seed strings with greedy decoding.

use anyhow::Result;

use crate::data::vocab::Vocabulary;
use crate::domain::traits::TextGenerator;
use crate::infra::model_store::ModelStore;
use crate::ml::{
    model::CharRnnModel,
    sampler::GreedySampler,
    trainer::model_config,
    InferBackend,
};

pub struct GenerateUseCase {
    model: CharRnnModel<InferBackend>,
    vocab: Vocabulary,
}

impl GenerateUseCase {
    pub fn new(model_dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        let store  = ModelStore::open(model_dir)?;
        let cfg    = store.load_config()?;
        let vocab  = store.load_vocab()?;
        let device = Default::default();

        let model: CharRnnModel<InferBackend> = model_config(&cfg, vocab.len()).init(&device);
        let model = store.load_model(model, &device)?;
        tracing::info!(
            "Model loaded from '{}' (vocab={}, layers={})",
            store.dir().display(), vocab.len(), model.num_layers()
        );
        Ok(Self { model, vocab })
    }
}

impl TextGenerator for GenerateUseCase {
    fn generate(&self, seed: &str, length: usize) -> Result<String> {
        Ok(GreedySampler::new(&self.model, &self.vocab)?.generate(seed, length)?)
    }
}
