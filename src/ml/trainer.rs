// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One sweep per epoch over shuffled mini-batches with Adam.
//
// Per batch:
//   a. detach the carried recurrent state
//   b. forward the input windows with that state
//   c. mean cross-entropy against the target windows
//   d. backward + one Adam step
//
// The state starts at zero each epoch and is threaded from batch
// to batch as plain numbers. A short trailing batch gets a fresh
// zero state of its own size.
//
// Key Burn insight:
//   - Gradients are rebuilt from scratch by every backward() call,
//     so there is no separate zero_grad step
//   - model.valid() gives the inner-backend model used for the
//     end-of-epoch monitor sample

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::{CharBatch, CharBatcher}, dataset::CharDataset, vocab::Vocabulary};
use crate::domain::error::PoetryError;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{CharRnnConfig, CharRnnModel, RecurrentState};
use crate::ml::sampler::GreedySampler;
use crate::ml::{InferBackend, TrainBackend};

/// What the loop observed, one entry per finished epoch
#[derive(Debug, Clone, Default)]
pub struct TrainReport {
    pub epochs: Vec<EpochMetrics>,
    pub steps:  usize,
}

impl TrainReport {
    pub fn last_loss(&self) -> Option<f64> {
        self.epochs.last().and_then(|m| m.final_loss)
    }
}

pub fn model_config(cfg: &TrainConfig, vocab_size: usize) -> CharRnnConfig {
    CharRnnConfig::new(vocab_size, cfg.embed_dim, cfg.hidden_dim)
        .with_num_layers(cfg.num_layers)
}

pub fn run_training(
    cfg:          &TrainConfig,
    vocab:        &Vocabulary,
    dataset:      CharDataset,
    monitor_seed: &str,
    metrics:      Option<&MetricsLogger>,
) -> Result<(CharRnnModel<InferBackend>, TrainReport)> {
    let device = <TrainBackend as Backend>::Device::default();
    tracing::info!("Using device: {:?}", device);

    TrainBackend::seed(cfg.seed);
    let model: CharRnnModel<TrainBackend> = model_config(cfg, vocab.len()).init(&device);
    tracing::info!(
        "Model ready: {} LSTM layer(s), embed_dim={}, hidden_dim={}, vocab={}",
        cfg.num_layers, cfg.embed_dim, cfg.hidden_dim, vocab.len()
    );

    let (model, report) = train_loop(cfg, model, vocab, dataset, monitor_seed, metrics, device)?;
    Ok((model.valid(), report))
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    mut model:    CharRnnModel<B>,
    vocab:        &Vocabulary,
    dataset:      CharDataset,
    monitor_seed: &str,
    metrics:      Option<&MetricsLogger>,
    device:       B::Device,
) -> Result<(CharRnnModel<B>, TrainReport)> {
    // Fail before the first epoch rather than after it
    vocab.encode(monitor_seed)?;
    if monitor_seed.is_empty() && cfg.monitor_len > 0 {
        return Err(PoetryError::EmptySeed.into());
    }

    let mut optim = AdamConfig::new().init::<B, CharRnnModel<B>>();

    let loader = if dataset.sample_count() == 0 {
        tracing::warn!("Dataset is empty; every epoch will run zero optimizer steps");
        None
    } else {
        Some(
            DataLoaderBuilder::new(CharBatcher::<B>::new(device))
                .batch_size(cfg.batch_size)
                .shuffle(cfg.seed)
                .num_workers(1)
                .build(dataset),
        )
    };

    let mut report = TrainReport::default();

    for epoch in 1..=cfg.epochs {
        let batches = loader.iter().flat_map(|l| l.iter());
        let outcome = run_epoch(model, &mut optim, batches, cfg)?;
        model = outcome.model;
        tracing::debug!("Epoch {} ended with state {:?}", epoch, outcome.state.dims());

        let steps     = outcome.steps;
        let mean_loss = (steps > 0).then(|| outcome.loss_sum / steps as f64);
        let valid     = model.valid();
        let sample    = GreedySampler::new(&valid, vocab)?
            .generate(monitor_seed, cfg.monitor_len)?;

        let m = EpochMetrics::new(epoch, outcome.final_loss, mean_loss, steps, sample);
        println!("{m}");
        if let Some(logger) = metrics {
            logger.log(&m)?;
        }

        report.steps += steps;
        report.epochs.push(m);
    }

    tracing::info!("Training complete: {} epochs, {} steps", cfg.epochs, report.steps);
    Ok((model, report))
}

struct EpochOutcome<B: Backend> {
    model:      CharRnnModel<B>,
    /// State carried out of the last batch
    state:      RecurrentState<B>,
    final_loss: Option<f64>,
    loss_sum:   f64,
    steps:      usize,
}

/// One sweep over `batches`, starting from a zero state.
fn run_epoch<B, O>(
    mut model: CharRnnModel<B>,
    optim:     &mut O,
    batches:   impl Iterator<Item = CharBatch<B>>,
    cfg:       &TrainConfig,
) -> Result<EpochOutcome<B>>
where
    B: AutodiffBackend,
    O: Optimizer<CharRnnModel<B>, B>,
{
    let mut state      = model.init_state(cfg.batch_size);
    let mut final_loss = None;
    let mut loss_sum   = 0.0f64;
    let mut steps      = 0usize;

    for batch in batches {
        let batch_size = check_batch(&batch, cfg)?;
        if state.batch_size() != batch_size {
            tracing::debug!("Short batch of {} samples; resetting state", batch_size);
            state = model.init_state(batch_size);
        }

        let (next_model, next_state, loss_val) = train_step(model, optim, batch, state, cfg.lr)?;
        model = next_model;
        state = next_state;

        loss_sum  += loss_val;
        steps     += 1;
        final_loss = Some(loss_val);
    }

    Ok(EpochOutcome { model, state, final_loss, loss_sum, steps })
}

/// Forward, backward and one optimizer step. Returns the updated model,
/// the detached state for the next batch and the batch loss.
fn train_step<B, O>(
    model: CharRnnModel<B>,
    optim: &mut O,
    batch: CharBatch<B>,
    state: RecurrentState<B>,
    lr:    f64,
) -> Result<(CharRnnModel<B>, RecurrentState<B>, f64)>
where
    B: AutodiffBackend,
    O: Optimizer<CharRnnModel<B>, B>,
{
    let (loss, next_state) = model.forward_loss(batch.inputs, batch.targets, state.detach())?;
    let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    let model = optim.step(lr, model, grads);
    Ok((model, next_state.detach(), loss_val))
}

/// Batch must be [b, seq_len] with 1 ≤ b ≤ batch_size; returns b.
fn check_batch<B: Backend>(
    batch: &CharBatch<B>,
    cfg:   &TrainConfig,
) -> std::result::Result<usize, PoetryError> {
    let [batch_size, seq_len] = batch.inputs.dims();
    if seq_len != cfg.seq_len || batch_size == 0 || batch_size > cfg.batch_size {
        return Err(PoetryError::shape(
            "batch inputs",
            &[cfg.batch_size, cfg.seq_len],
            &[batch_size, seq_len],
        ));
    }
    Ok(batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{Autodiff, NdArray},
        data::{dataloader::batcher::Batcher, dataset::Dataset},
        record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    };

    use crate::data::indexer::WindowIndexer;
    use crate::domain::{corpus::Corpus, sample::CharSample};

    type TestBackend = Autodiff<NdArray>;

    fn small_config(epochs: usize) -> TrainConfig {
        TrainConfig {
            seq_len:     3,
            embed_dim:   8,
            hidden_dim:  12,
            batch_size:  2,
            epochs,
            monitor_len: 5,
            ..TrainConfig::default()
        }
    }

    fn setup(cfg: &TrainConfig, text: &str) -> (Vocabulary, CharDataset, CharRnnModel<TestBackend>) {
        let corpus  = Corpus::from_text(text).unwrap();
        let vocab   = Vocabulary::build(&corpus).unwrap();
        let encoded: Vec<Vec<usize>> = corpus
            .lines()
            .iter()
            .map(|l| vocab.encode(l).unwrap())
            .collect();
        let (samples, _) = WindowIndexer::new(cfg.seq_len).unwrap().index(&encoded);
        let model = model_config(cfg, vocab.len()).init::<TestBackend>(&Default::default());
        (vocab, CharDataset::new(samples), model)
    }

    /// Every parameter of the model (embedding, LSTM gates, output) as bytes
    fn weights(model: &CharRnnModel<TestBackend>) -> Vec<u8> {
        BinBytesRecorder::<FullPrecisionSettings>::default()
            .record(model.clone().into_record(), ())
            .unwrap()
    }

    fn batch(dataset: &CharDataset, range: std::ops::Range<usize>) -> CharBatch<TestBackend> {
        let samples: Vec<CharSample> = range.map(|i| dataset.get(i).unwrap()).collect();
        CharBatcher::<TestBackend>::new(Default::default()).batch(samples)
    }

    fn values(t: &Tensor<TestBackend, 3>) -> Vec<f32> {
        t.clone().into_data().to_vec::<f32>().unwrap()
    }

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-6, "{x} != {y}");
        }
    }

    #[test]
    fn test_zero_epochs_leaves_parameters_untouched() {
        let cfg = small_config(0);
        let (vocab, dataset, model) = setup(&cfg, "白日依山尽\n黄河入海流");
        let before = weights(&model);

        let (model, report) =
            train_loop(&cfg, model, &vocab, dataset, "白", None, Default::default()).unwrap();

        assert_eq!(weights(&model), before);
        assert!(report.epochs.is_empty());
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn test_epochs_report_loss_and_sample() {
        let cfg = small_config(2);
        // "白日依山尽" (5 chars) → 2 samples, "黄河入海流" → 2 samples, "欲穷" → 0
        let (vocab, dataset, model) = setup(&cfg, "白日依山尽\n黄河入海流\n欲穷");
        assert_eq!(dataset.sample_count(), 4);
        let before = weights(&model);

        let (model, report) =
            train_loop(&cfg, model, &vocab, dataset, "黄河", None, Default::default()).unwrap();

        assert_eq!(report.epochs.len(), 2);
        assert_eq!(report.steps, 4);
        for (i, m) in report.epochs.iter().enumerate() {
            assert_eq!(m.epoch, i + 1);
            assert_eq!(m.steps, 2);
            assert!(m.final_loss.is_some_and(f64::is_finite));
            assert!(m.sample.starts_with("黄河"));
            assert_eq!(m.sample.chars().count(), 2 + cfg.monitor_len);
        }
        assert_ne!(weights(&model), before);
    }

    #[test]
    fn test_short_trailing_batch_is_trained() {
        let cfg = small_config(1);
        // 3 samples with batch_size 2 → batches of 2 and 1
        let (vocab, dataset, model) = setup(&cfg, "锄禾日当午\n汗滴禾下");
        assert_eq!(dataset.sample_count(), 3);

        let (_, report) =
            train_loop(&cfg, model, &vocab, dataset, "禾", None, Default::default()).unwrap();
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn test_empty_dataset_runs_without_steps() {
        let cfg = small_config(2);
        let (vocab, dataset, model) = setup(&cfg, "春晓\n静夜");
        assert_eq!(dataset.sample_count(), 0);

        let (_, report) =
            train_loop(&cfg, model, &vocab, dataset, "春", None, Default::default()).unwrap();
        assert_eq!(report.epochs.len(), 2);
        assert_eq!(report.steps, 0);
        assert_eq!(report.last_loss(), None);
    }

    #[test]
    fn test_unknown_monitor_seed_fails_before_training() {
        let cfg = small_config(1);
        let (vocab, dataset, model) = setup(&cfg, "白日依山尽");
        let err = train_loop(&cfg, model, &vocab, dataset, "月", None, Default::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<PoetryError>(),
            Some(&PoetryError::VocabularyLookup { ch: '月' })
        );
    }

    #[test]
    fn test_empty_monitor_seed_fails_before_training() {
        let cfg = small_config(3);
        let (vocab, dataset, model) = setup(&cfg, "白日依山尽");
        let err = train_loop(&cfg, model, &vocab, dataset, "", None, Default::default())
            .unwrap_err();
        assert_eq!(err.downcast_ref::<PoetryError>(), Some(&PoetryError::EmptySeed));
    }

    #[test]
    fn test_train_step_returns_detached_state() {
        let cfg = small_config(1);
        let (_, dataset, model) = setup(&cfg, "白日依山尽\n黄河入海流");
        let mut optim = AdamConfig::new().init::<TestBackend, CharRnnModel<TestBackend>>();

        let state = model.init_state(2);
        let (_, next, loss) = train_step(model, &mut optim, batch(&dataset, 0..2), state, cfg.lr)
            .unwrap();

        assert!(loss.is_finite());
        assert!(!next.hidden.is_require_grad());
        assert!(!next.cell.is_require_grad());
        assert!(values(&next.hidden).iter().any(|v| *v != 0.0));
    }

    #[test]
    fn test_state_is_carried_between_batches_and_reset_per_epoch() {
        let cfg = small_config(2);
        // 4 samples → two full batches of 2
        let (_, dataset, model) = setup(&cfg, "白日依山尽\n黄河入海流");
        assert_eq!(dataset.sample_count(), 4);

        // Two epochs through run_epoch
        let mut optim = AdamConfig::new().init::<TestBackend, CharRnnModel<TestBackend>>();
        let mut trained = model.clone();
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let batches = vec![batch(&dataset, 0..2), batch(&dataset, 2..4)];
            let outcome = run_epoch(trained, &mut optim, batches.into_iter(), &cfg).unwrap();
            assert_eq!(outcome.steps, 2);
            trained = outcome.model;
            outcomes.push(outcome.state);
        }

        // Same steps by hand: zero state at each epoch start, then the
        // first batch's output state feeds the second batch
        let mut optim = AdamConfig::new().init::<TestBackend, CharRnnModel<TestBackend>>();
        let mut manual = model;
        for expected in &outcomes {
            let start = manual.init_state(2);
            assert!(values(&start.hidden).iter().all(|v| *v == 0.0));

            let (m, carried, _) =
                train_step(manual, &mut optim, batch(&dataset, 0..2), start, cfg.lr).unwrap();
            assert!(values(&carried.hidden).iter().any(|v| *v != 0.0));
            let (m, last, _) =
                train_step(m, &mut optim, batch(&dataset, 2..4), carried, cfg.lr).unwrap();
            manual = m;

            assert_close(&values(&last.hidden), &values(&expected.hidden));
            assert_close(&values(&last.cell), &values(&expected.cell));
        }
        let out = |m: &CharRnnModel<TestBackend>| {
            m.output.weight.val().into_data().to_vec::<f32>().unwrap()
        };
        assert_close(&out(&manual), &out(&trained));
    }

    #[test]
    fn test_check_batch_rejects_wrong_window() {
        let cfg = small_config(1);
        let batcher = CharBatcher::<NdArray>::new(Default::default());
        let batch = burn::data::dataloader::batcher::Batcher::batch(
            &batcher,
            vec![CharSample::new(vec![0, 1], vec![1, 2])],
        );
        assert_eq!(
            check_batch(&batch, &cfg).unwrap_err(),
            PoetryError::shape("batch inputs", &[2, 3], &[1, 2])
        );
    }
}
