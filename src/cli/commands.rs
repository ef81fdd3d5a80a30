// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands: `train` and `generate`.

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the character model on a poem corpus
    Train(TrainArgs),

    /// Continue a seed string with a model saved by `train --output-dir`
    Generate(GenerateArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// UTF-8 text file with one poem per line
    #[arg(long, default_value = "data/poetry.txt")]
    pub corpus: String,

    /// Directory for the trained model, vocabulary and metrics.
    /// Nothing is written when omitted.
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Characters per training window
    #[arg(long, default_value_t = 50)]
    pub seq_len: usize,

    #[arg(long, default_value_t = 64)]
    pub embed_dim: usize,

    #[arg(long, default_value_t = 128)]
    pub hidden_dim: usize,

    /// Number of stacked LSTM layers
    #[arg(long, default_value_t = 1)]
    pub num_layers: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.002)]
    pub lr: f64,

    /// Seed for parameter initialisation and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub rng_seed: u64,

    /// Seed string for generated samples (default: first character of the corpus)
    #[arg(long)]
    pub seed_text: Option<String>,

    /// Characters generated after each epoch
    #[arg(long, default_value_t = 30)]
    pub monitor_len: usize,

    /// Characters generated once training finishes
    #[arg(long, default_value_t = 100)]
    pub sample_len: usize,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_path: a.corpus,
            output_dir:  a.output_dir,
            seq_len:     a.seq_len,
            embed_dim:   a.embed_dim,
            hidden_dim:  a.hidden_dim,
            num_layers:  a.num_layers,
            batch_size:  a.batch_size,
            epochs:      a.epochs,
            lr:          a.lr,
            seed:        a.rng_seed,
            seed_text:   a.seed_text,
            monitor_len: a.monitor_len,
            sample_len:  a.sample_len,
        }
    }
}

/// All arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory written by `train --output-dir`
    #[arg(long)]
    pub model_dir: String,

    /// Text to continue; every character must be in the training vocabulary
    #[arg(long)]
    pub seed_text: String,

    /// Number of characters to generate
    #[arg(long, default_value_t = 100)]
    pub length: usize,
}
