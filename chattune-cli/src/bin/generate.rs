//! Generate a reply to a single prompt with a GGUF chat model

use anyhow::{Context, Result};
use chattune_cli::args::ModelArgs;
use chattune_cli::settings::Settings;
use chattune_cli::{init_tracing, loader};
use chattune_engine::generate_with_config;
use clap::Parser;
use std::io::Read;

#[derive(Parser)]
#[command(name = "chattune-generate")]
#[command(about = "Generate text from a prompt through the model's chat template")]
struct Cli {
    /// Prompt text (read from stdin when omitted)
    prompt: Option<String>,

    #[command(flatten)]
    model: ModelArgs,

    /// Maximum number of new tokens
    #[arg(long)]
    max_new_tokens: Option<usize>,

    /// Use greedy decoding instead of sampling
    #[arg(long)]
    greedy: bool,

    #[arg(long)]
    temperature: Option<f32>,

    #[arg(long)]
    top_k: Option<i32>,

    #[arg(long)]
    top_p: Option<f32>,

    /// Sampling seed
    #[arg(long)]
    seed: Option<u32>,

    /// Layers to offload to the GPU (0 = CPU only)
    #[arg(long)]
    gpu_layers: Option<u32>,

    /// Context window size
    #[arg(long)]
    n_ctx: Option<u32>,

    /// Inference threads (0 = llama.cpp default)
    #[arg(long)]
    n_threads: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        self.model.apply(&mut settings.model);

        let model = &mut settings.model;
        if let Some(n) = self.gpu_layers {
            model.gpu_layers = n;
        }
        if let Some(n) = self.n_ctx {
            model.n_ctx = n;
        }
        if let Some(n) = self.n_threads {
            model.n_threads = n;
        }

        let generation = &mut settings.generation;
        if let Some(n) = self.max_new_tokens {
            generation.max_new_tokens = n;
        }
        if self.greedy {
            generation.do_sample = false;
        }
        if let Some(t) = self.temperature {
            generation.temperature = t;
        }
        if let Some(k) = self.top_k {
            generation.top_k = k;
        }
        if let Some(p) = self.top_p {
            generation.top_p = p;
        }
        if let Some(seed) = self.seed {
            generation.seed = Some(seed);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load_or_default(cli.model.config.as_deref())?;
    cli.apply(&mut settings);

    let prompt = match &cli.prompt {
        Some(prompt) => prompt.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read prompt from stdin")?;
            buf.trim_end().to_string()
        }
    };

    let (model, tokenizer) = loader::load_model(&settings.model)?;
    let config = settings.generation.to_config();
    tracing::debug!("Generation config: {:?}", config);

    let decoded = generate_with_config(&prompt, &model, &tokenizer, &config)?;
    for text in decoded {
        println!("{}", text);
    }

    Ok(())
}
