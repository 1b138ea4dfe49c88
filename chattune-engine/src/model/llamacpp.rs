//! llama.cpp based GGUF inference via the llama-cpp-2 crate
//!
//! The model works purely on token ids. Tokenization and chat templating
//! live in [`crate::tokenizer::ChatTokenizer`].

use super::{Device, Generate};
use crate::error::{ChatError, Result};
use crate::generate::GenerationConfig;
use crate::tokenizer::EncodedPrompt;
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::LlamaModel;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::token::LlamaToken;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Global llama.cpp backend (can only be initialized once)
static LLAMA_BACKEND: OnceLock<std::result::Result<LlamaBackend, String>> = OnceLock::new();

/// Default context window; grown per call when prompt + new tokens need more.
const DEFAULT_N_CTX: u32 = 2048;

/// Minimum batch capacity for prompt evaluation
const MIN_BATCH: usize = 512;

/// Get or initialize the global llama.cpp backend
fn get_backend() -> Result<&'static LlamaBackend> {
    let result = LLAMA_BACKEND.get_or_init(|| {
        let mut backend = LlamaBackend::init().map_err(|e| e.to_string())?;
        backend.void_logs();
        Ok(backend)
    });
    match result {
        Ok(backend) => Ok(backend),
        Err(e) => Err(ChatError::ModelLoad(
            format!("Failed to initialize llama.cpp backend: {}", e).into(),
        )),
    }
}

/// Sampler chain for a generation config.
///
/// `do_sample = false` means greedy decoding.
fn build_sampler(config: &GenerationConfig) -> LlamaSampler {
    if !config.do_sample {
        return LlamaSampler::greedy();
    }
    LlamaSampler::chain_simple([
        LlamaSampler::top_k(config.top_k),
        LlamaSampler::top_p(config.top_p, 1),
        LlamaSampler::temp(config.temperature),
        // u32::MAX is llama.cpp's LLAMA_DEFAULT_SEED: draw a random seed
        LlamaSampler::dist(config.seed.unwrap_or(u32::MAX)),
    ])
}

/// llama.cpp causal LM loaded from a GGUF file
pub struct LlamaCppModel {
    model: LlamaModel,
    device: Device,
    n_ctx: u32,
    /// Number of threads for inference (0 = use llama.cpp default)
    n_threads: u32,
}

impl LlamaCppModel {
    /// Load a GGUF model, offloading layers according to `device`.
    pub fn from_file<P: AsRef<Path>>(path: P, device: Device) -> Result<Self> {
        Self::from_file_with_n_ctx(path, device, DEFAULT_N_CTX)
    }

    /// Load a GGUF model with explicit context window size
    pub fn from_file_with_n_ctx<P: AsRef<Path>>(path: P, device: Device, n_ctx: u32) -> Result<Self> {
        let backend = get_backend()?;

        let model_params = LlamaModelParams::default().with_n_gpu_layers(device.gpu_layers());

        tracing::info!("Loading GGUF from {:?} on {:?}", path.as_ref(), device);
        let model = LlamaModel::load_from_file(backend, path.as_ref(), &model_params)
            .map_err(|e| ChatError::ModelLoad(e.into()))?;

        Ok(Self {
            model,
            device,
            n_ctx,
            n_threads: 0,
        })
    }

    /// Set the number of threads for inference.
    /// 0 means use llama.cpp default (typically all cores).
    pub fn set_n_threads(&mut self, n: u32) {
        self.n_threads = n;
    }

    /// Context params large enough for `n_tokens` positions, evaluated in one batch
    fn context_params(&self, n_tokens: usize, n_batch: usize) -> Result<LlamaContextParams> {
        let n_ctx = u32::try_from(n_tokens)
            .unwrap_or(u32::MAX)
            .max(self.n_ctx);
        let n_ctx = NonZeroU32::new(n_ctx)
            .ok_or_else(|| ChatError::Inference("context size must be non-zero".into()))?;
        let n_batch = u32::try_from(n_batch).unwrap_or(u32::MAX);

        let params = LlamaContextParams::default()
            .with_n_ctx(Some(n_ctx))
            .with_n_batch(n_batch);
        if self.n_threads > 0 {
            Ok(params
                .with_n_threads(self.n_threads as i32)
                .with_n_threads_batch(self.n_threads as i32))
        } else {
            Ok(params)
        }
    }

    fn is_eos_token(&self, token: LlamaToken, eos_token_id: Option<i32>) -> bool {
        eos_token_id.is_some_and(|eos| token.0 == eos)
            || token == self.model.vocab().eos()
            || self.model.vocab().is_eog(token)
    }

    /// Generate up to `max_new_tokens` tokens after `input_tokens` with `sampler`.
    ///
    /// The returned sequence starts with `input_tokens`. A sampled stop token
    /// (`eos_token_id`, the model EOS, or any EOG token) is kept as the last
    /// token and counts against `max_new_tokens`.
    pub fn generate_with_sampler(
        &self,
        input_tokens: &[LlamaToken],
        max_new_tokens: usize,
        eos_token_id: Option<i32>,
        mut sampler: LlamaSampler,
    ) -> Result<Vec<LlamaToken>> {
        if input_tokens.is_empty() {
            return Err(ChatError::Inference("cannot generate from an empty prompt".into()));
        }

        let backend = get_backend()?;
        let n_batch = input_tokens.len().max(MIN_BATCH);
        // Prompt plus cap, clamped to the training context (never below the prompt)
        let needed = input_tokens
            .len()
            .saturating_add(max_new_tokens)
            .min(self.model.n_ctx_train() as usize)
            .max(input_tokens.len());
        let ctx_params = self.context_params(needed, n_batch)?;

        let mut ctx = self
            .model
            .new_context(backend, ctx_params)
            .map_err(|e| ChatError::Inference(e.into()))?;

        let mut batch = LlamaBatch::new(n_batch, 1);
        let mut generated = input_tokens.to_vec();

        // Process input tokens
        for (i, token) in input_tokens.iter().enumerate() {
            let is_last = i == input_tokens.len() - 1;
            batch
                .add(*token, i as i32, &[0], is_last)
                .map_err(|e| ChatError::Inference(e.into()))?;
        }

        ctx.decode(&mut batch)
            .map_err(|e| ChatError::Inference(e.into()))?;

        let mut n_cur = input_tokens.len();
        let n_ctx = ctx.n_ctx() as usize;

        for _ in 0..max_new_tokens {
            let new_token = sampler.sample(&ctx, -1);
            generated.push(new_token);

            if self.is_eos_token(new_token, eos_token_id) || n_cur + 1 >= n_ctx {
                break;
            }

            // Prepare next batch with just the new token
            batch.clear();
            batch
                .add(new_token, n_cur as i32, &[0], true)
                .map_err(|e| ChatError::Inference(e.into()))?;

            ctx.decode(&mut batch)
                .map_err(|e| ChatError::Inference(e.into()))?;
            n_cur += 1;
        }

        debug!(
            "Generated {} new tokens (cap {})",
            generated.len() - input_tokens.len(),
            max_new_tokens
        );
        Ok(generated)
    }
}

impl Generate for LlamaCppModel {
    fn device(&self) -> Option<Device> {
        Some(self.device)
    }

    fn generate(&self, prompt: &EncodedPrompt, config: &GenerationConfig) -> Result<Vec<u32>> {
        if prompt.device() != self.device {
            debug!(
                "Prompt staged on {:?}, model runs on {:?}",
                prompt.device(),
                self.device
            );
        }
        let tokens: Vec<LlamaToken> = prompt.ids().iter().map(|&id| LlamaToken(id as i32)).collect();
        let output = self.generate_with_sampler(
            &tokens,
            config.max_new_tokens,
            config.eos_token_id.map(|id| id as i32),
            build_sampler(config),
        )?;
        Ok(output.iter().map(|t| t.0 as u32).collect())
    }
}
