//! Prompt-to-text generation through the chat template

use tracing::{debug, warn};

use crate::chat::ChatMessage;
use crate::error::Result;
use crate::model::Generate;
use crate::tokenizer::ChatTokenizer;

/// Cap on newly generated tokens per call
pub const MAX_NEW_TOKENS: usize = 1000;

/// Sampling parameters for a generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Maximum number of new tokens to generate
    pub max_new_tokens: usize,
    /// Sample from the distribution; greedy decoding when false
    pub do_sample: bool,
    pub temperature: f32,
    pub top_k: i32,
    pub top_p: f32,
    /// Fixed sampling seed (random when unset)
    pub seed: Option<u32>,
    /// Extra stop token; filled from the tokenizer's EOS when unset
    pub eos_token_id: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: MAX_NEW_TOKENS,
            do_sample: true,
            temperature: 0.8,
            top_k: 40,
            top_p: 0.95,
            seed: None,
            eos_token_id: None,
        }
    }
}

/// Generate a reply to a single user prompt with the default sampling config.
///
/// Returns the batch-decoded output (one entry), prompt included and special
/// tokens kept.
pub fn generate_from_prompt<M: Generate + ?Sized>(
    prompt: &str,
    model: &M,
    tokenizer: &ChatTokenizer,
) -> Result<Vec<String>> {
    generate_with_config(prompt, model, tokenizer, &GenerationConfig::default())
}

/// [`generate_from_prompt`] with explicit sampling parameters.
pub fn generate_with_config<M: Generate + ?Sized>(
    prompt: &str,
    model: &M,
    tokenizer: &ChatTokenizer,
    config: &GenerationConfig,
) -> Result<Vec<String>> {
    let messages = [ChatMessage::user(prompt)];
    let mut encoded = tokenizer.encode_chat(&messages, false)?;
    if let Some(device) = model.device() {
        encoded = encoded.to(device);
    }

    let config = GenerationConfig {
        eos_token_id: config.eos_token_id.or_else(|| tokenizer.eos_token_id()),
        ..config.clone()
    };

    let prompt_len = encoded.len();
    let mut output = model.generate(&encoded, &config)?;

    let limit = prompt_len.saturating_add(config.max_new_tokens);
    if output.len() > limit {
        warn!(
            "Model returned {} new tokens, truncating to {}",
            output.len() - prompt_len,
            config.max_new_tokens
        );
        output.truncate(limit);
    }
    debug!(
        "Prompt {} tokens, output {} tokens",
        prompt_len,
        output.len()
    );

    tokenizer.batch_decode(&[output], false)
}
