// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   1. `train`    — trains the model on a poem corpus
//   2. `generate` — loads a saved model and continues a seed

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, TrainArgs};

use crate::domain::traits::TextGenerator;

#[derive(Parser, Debug)]
#[command(
    name = "poetry-char-rnn",
    version,
    about = "Train a character-level LSTM on classical poetry, then generate verse."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Generate(args) => run_generate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus: {}", args.corpus);

    let use_case = TrainUseCase::new(args.into());
    let text = use_case.execute()?;

    println!("\n{text}");
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let generator = GenerateUseCase::new(&args.model_dir)?;
    let text = generator.generate(&args.seed_text, args.length)?;
    println!("{text}");
    Ok(())
}
