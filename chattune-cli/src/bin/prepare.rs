//! Build a chat-formatted training dataset from instruction/response pairs
//!
//! Each pair is rendered through the model's chat template and written as a
//! `{"text": ...}` JSON line.

use anyhow::{Context, Result};
use chattune_cli::args::ModelArgs;
use chattune_cli::settings::Settings;
use chattune_cli::{init_tracing, loader};
use chattune_engine::{get_dataset, read_pairs, write_jsonl};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chattune-prepare")]
#[command(about = "Render instruction/response pairs through a chat template")]
struct Cli {
    /// Input file of {"instruction", "response"} records (JSON lines or JSON array)
    input: PathBuf,

    /// Also save the formatted JSON lines to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of formatted examples to print
    #[arg(long, default_value_t = 1)]
    show: usize,

    #[command(flatten)]
    model: ModelArgs,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load_or_default(cli.model.config.as_deref())?;
    cli.model.apply(&mut settings.model);

    let tokenizer = loader::load_tokenizer(&settings.model)?;

    let pairs = read_pairs(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    tracing::info!("Loaded {} pairs from {}", pairs.len(), cli.input.display());

    let dataset = get_dataset(&pairs, &tokenizer)?;

    for (i, text) in dataset.texts().take(cli.show).enumerate() {
        println!("--- example {} ---", i + 1);
        println!("{}", text);
    }
    println!(
        "Dataset split '{}' with {} examples",
        dataset.split(),
        dataset.len()
    );

    if let Some(output_path) = &cli.output {
        let file = File::create(output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        let written = write_jsonl(file, &pairs, &tokenizer)?;
        eprintln!("Saved {} records to {}", written, output_path.display());
    }

    Ok(())
}
