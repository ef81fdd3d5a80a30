// ============================================================
// Layer 6 — Model Store
// ============================================================
// Writes the trained model so `generate` can run without
// retraining. One artifact per run, written after the last
// epoch; there are no per-epoch checkpoints and no resume.
//
// File layout:
//   <output_dir>/
//     train_config.json   ← hyperparameters (rebuilds the model)
//     vocab.json          ← ordered character list
//     model.mpk.gz        ← weights, full precision
//     metrics.csv         ← one row per epoch (MetricsLogger)
//
// Records are gzipped MessagePack at full precision, so a reloaded
// model generates exactly the same text as the one that was saved.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::vocab::Vocabulary;
use crate::domain::traits::Persistable;
use crate::ml::model::CharRnnModel;

// The recorder appends ".mpk.gz"
const MODEL_FILE:  &str = "model";
const CONFIG_FILE: &str = "train_config.json";
const VOCAB_FILE:  &str = "vocab.json";

type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Opens (and creates, if needed) the artifact directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Opens an existing artifact directory without creating it.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        anyhow::ensure!(
            dir.is_dir(),
            "Model directory '{}' does not exist. Run 'train --output-dir' first.",
            dir.display()
        );
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn save_model<B: Backend>(&self, model: &CharRnnModel<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        ModelRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;
        tracing::info!("Saved model weights to '{}'", path.display());
        Ok(())
    }

    /// `model` must have the saved architecture; it is rebuilt from
    /// `train_config.json` before its weights are replaced.
    pub fn load_model<B: Backend>(
        &self,
        model:  CharRnnModel<B>,
        device: &B::Device,
    ) -> Result<CharRnnModel<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained the model first?",
                    path.display())
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_vocab(&self, vocab: &Vocabulary) -> Result<()> {
        vocab.save(&self.path_str(VOCAB_FILE))
    }

    pub fn load_vocab(&self) -> Result<Vocabulary> {
        Vocabulary::load(&self.path_str(VOCAB_FILE))
    }

    fn path_str(&self, file: &str) -> String {
        self.dir.join(file).to_string_lossy().into_owned()
    }
}
