//! HuggingFace tokenizer paired with the model's chat template

use std::path::Path;

use tracing::debug;

use crate::chat::{ChatMessage, ChatTemplate};
use crate::error::{ChatError, Result};
use crate::model::Device;

/// Token ids of a templated prompt, tagged with the device they are staged for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPrompt {
    ids: Vec<u32>,
    device: Device,
}

impl EncodedPrompt {
    /// Wrap host-side token ids. New prompts always start on [`Device::Cpu`].
    pub fn new(ids: Vec<u32>) -> Self {
        EncodedPrompt {
            ids,
            device: Device::Cpu,
        }
    }

    /// Move the prompt onto `device`.
    pub fn to(self, device: Device) -> Self {
        EncodedPrompt { device, ..self }
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn load_tokenizer<P: AsRef<Path>>(path: P) -> Result<tokenizers::Tokenizer> {
    debug!("Loading tokenizer from {:?}", path.as_ref());
    tokenizers::Tokenizer::from_file(path.as_ref()).map_err(ChatError::TokenizerLoad)
}

/// Tokenizer plus chat template, the pair `apply_chat_template` needs
pub struct ChatTokenizer {
    tokenizer: tokenizers::Tokenizer,
    template: ChatTemplate,
}

impl ChatTokenizer {
    /// Load from `tokenizer.json` and `tokenizer_config.json`.
    pub fn from_files<P: AsRef<Path>, C: AsRef<Path>>(
        tokenizer_json: P,
        tokenizer_config: C,
    ) -> Result<Self> {
        let tokenizer = load_tokenizer(tokenizer_json)?;
        let template = ChatTemplate::from_tokenizer_config(tokenizer_config)?;
        Ok(Self::from_parts(tokenizer, template))
    }

    pub fn from_parts(mut tokenizer: tokenizers::Tokenizer, template: ChatTemplate) -> Self {
        // Sequence length is bounded by the model context, and pad tokens
        // would end up inside the prompt.
        tokenizer.with_padding(None);
        tokenizer.with_truncation(None).ok();
        ChatTokenizer {
            tokenizer,
            template,
        }
    }

    pub fn template(&self) -> &ChatTemplate {
        &self.template
    }

    /// Render a conversation without tokenizing it.
    pub fn apply_chat_template(
        &self,
        messages: &[ChatMessage],
        add_generation_prompt: bool,
    ) -> Result<String> {
        self.template.render(messages, add_generation_prompt)
    }

    /// Render a conversation and tokenize the result.
    ///
    /// Special tokens are not added on top: the template already emits them.
    pub fn encode_chat(
        &self,
        messages: &[ChatMessage],
        add_generation_prompt: bool,
    ) -> Result<EncodedPrompt> {
        let text = self.apply_chat_template(messages, add_generation_prompt)?;
        let ids = self.encode(&text)?;
        debug!("Encoded {} messages into {} tokens", messages.len(), ids.len());
        Ok(EncodedPrompt::new(ids))
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(ChatError::Inference)?;
        Ok(encoding.get_ids().to_vec())
    }

    pub fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        self.tokenizer
            .decode(ids, skip_special_tokens)
            .map_err(ChatError::Inference)
    }

    /// Decode each sequence of a batch.
    pub fn batch_decode(
        &self,
        sequences: &[Vec<u32>],
        skip_special_tokens: bool,
    ) -> Result<Vec<String>> {
        sequences
            .iter()
            .map(|ids| self.decode(ids, skip_special_tokens))
            .collect()
    }

    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.tokenizer.token_to_id(token)
    }

    /// Id of the template's EOS token, if the vocabulary has it.
    pub fn eos_token_id(&self) -> Option<u32> {
        self.template
            .eos_token()
            .and_then(|token| self.token_to_id(token))
    }
}
