// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Validate hyperparameters
//   Step 2: Load the poem corpus      (Layer 4 - data)
//   Step 3: Build the vocabulary      (Layer 4 - data)
//   Step 4: Index windows → dataset   (Layer 4 - data)
//   Step 5: Prepare the artifact dir  (Layer 6 - infra)
//   Step 6: Run the training loop     (Layer 5 - ml)
//   Step 7: Generate the final sample (Layer 5 - ml)
//   Step 8: Save the trained model    (Layer 6 - infra)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::CharDataset,
    indexer::WindowIndexer,
    loader::TextCorpusLoader,
    vocab::Vocabulary,
};
use crate::domain::error::PoetryError;
use crate::domain::traits::CorpusSource;
use crate::infra::{metrics::MetricsLogger, model_store::ModelStore};
use crate::ml::{sampler::GreedySampler, trainer::run_training};

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved next to the model so `generate` can rebuild the architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_path: String,
    pub output_dir:  Option<String>,
    pub seq_len:     usize,
    pub embed_dim:   usize,
    pub hidden_dim:  usize,
    pub num_layers:  usize,
    pub batch_size:  usize,
    pub epochs:      usize,
    pub lr:          f64,
    /// Seeds parameter init and batch shuffling
    pub seed:        u64,
    /// Seed string for the monitor and final samples;
    /// the corpus's first character when unset
    pub seed_text:   Option<String>,
    pub monitor_len: usize,
    pub sample_len:  usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_path: "data/poetry.txt".to_string(),
            output_dir:  None,
            seq_len:     50,
            embed_dim:   64,
            hidden_dim:  128,
            num_layers:  1,
            batch_size:  32,
            epochs:      10,
            lr:          0.002,
            seed:        42,
            seed_text:   None,
            monitor_len: 30,
            sample_len:  100,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> std::result::Result<(), PoetryError> {
        let sizes = [
            ("seq_len",    self.seq_len),
            ("embed_dim",  self.embed_dim),
            ("hidden_dim", self.hidden_dim),
            ("num_layers", self.num_layers),
            ("batch_size", self.batch_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(PoetryError::InvalidConfig(format!("{name} must be at least 1")));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(PoetryError::InvalidConfig(format!(
                "learning rate must be positive, got {}", self.lr
            )));
        }
        let generates = self.monitor_len > 0 || self.sample_len > 0;
        if generates && self.seed_text.as_deref() == Some("") {
            return Err(PoetryError::EmptySeed);
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Runs the whole pipeline and returns the final generated text.
    pub fn execute(&self) -> Result<String> {
        let cfg = &self.config;

        // ── Step 1: Validate ─────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load corpus ──────────────────────────────────────────────
        let corpus = TextCorpusLoader::new(&cfg.corpus_path).load()?;

        // ── Step 3: Vocabulary ───────────────────────────────────────────────
        let vocab = Vocabulary::build(&corpus)?;
        println!("Vocabulary size: {}", vocab.len());

        // ── Step 4: Windows → dataset ────────────────────────────────────────
        let encoded = corpus
            .lines()
            .iter()
            .map(|line| vocab.encode(line))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let (samples, stats) = WindowIndexer::new(cfg.seq_len)?.index(&encoded);
        tracing::debug!("Index stats: {:?}", stats);
        let dataset = CharDataset::new(samples);

        let seed_text = match &cfg.seed_text {
            Some(text) => text.clone(),
            None => corpus
                .first_char()
                .map(String::from)
                .ok_or_else(|| PoetryError::Corpus("corpus has no characters".into()))?,
        };

        // ── Step 5: Artifact directory ───────────────────────────────────────
        let store = match &cfg.output_dir {
            Some(dir) => {
                let store = ModelStore::new(dir)?;
                store.save_config(cfg)?;
                store.save_vocab(&vocab)?;
                Some(store)
            }
            None => None,
        };
        let metrics = store
            .as_ref()
            .map(|s| MetricsLogger::new(s.dir().clone()))
            .transpose()?;

        // ── Step 6: Train ────────────────────────────────────────────────────
        let (model, report) = run_training(cfg, &vocab, dataset, &seed_text, metrics.as_ref())?;
        tracing::info!("Last epoch loss: {:?}", report.last_loss());

        // ── Step 7: Final sample ─────────────────────────────────────────────
        let text = GreedySampler::new(&model, &vocab)?.generate(&seed_text, cfg.sample_len)?;

        // ── Step 8: Save ─────────────────────────────────────────────────────
        if let Some(store) = &store {
            store.save_model(&model)?;
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = TrainConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.seq_len, 50);
        assert_eq!(cfg.batch_size, 32);
        assert_eq!(cfg.lr, 0.002);
    }

    #[test]
    fn test_zero_sizes_and_bad_lr_are_rejected() {
        let cfg = TrainConfig { batch_size: 0, ..TrainConfig::default() };
        assert_eq!(
            cfg.validate().unwrap_err(),
            PoetryError::InvalidConfig("batch_size must be at least 1".into())
        );

        let cfg = TrainConfig { lr: 0.0, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(PoetryError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_seed_text_is_rejected_when_sampling() {
        let cfg = TrainConfig { seed_text: Some(String::new()), ..TrainConfig::default() };
        assert_eq!(cfg.validate().unwrap_err(), PoetryError::EmptySeed);

        let cfg = TrainConfig { monitor_len: 0, sample_len: 0, ..cfg };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_seed_text_fails_before_loading_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("poems.txt");
        std::fs::write(&corpus, "白日依山尽\n黄河入海流").unwrap();
        let cfg = TrainConfig {
            corpus_path: corpus.to_string_lossy().into_owned(),
            output_dir:  Some(dir.path().join("run").to_string_lossy().into_owned()),
            seq_len:     3,
            epochs:      3,
            seed_text:   Some(String::new()),
            monitor_len: 0,
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert_eq!(err.downcast_ref::<PoetryError>(), Some(&PoetryError::EmptySeed));
        assert!(!dir.path().join("run").exists());
    }

    #[test]
    fn test_missing_corpus_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            corpus_path: dir.path().join("absent.txt").to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PoetryError>(),
            Some(PoetryError::Corpus(_))
        ));
    }
}
