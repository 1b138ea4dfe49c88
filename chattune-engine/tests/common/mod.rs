//! Shared fixtures: an in-memory word-level tokenizer and a scripted model.

#![allow(dead_code)]

use std::cell::RefCell;
use std::str::FromStr;

use chattune_engine::{
    ChatTemplate, ChatTokenizer, Device, EncodedPrompt, Generate, GenerationConfig, Result,
};

pub const UNK: u32 = 0;
pub const BOS: u32 = 1;
pub const EOS: u32 = 2;
pub const USER: u32 = 3;
pub const ASSISTANT: u32 = 4;
pub const HELLO: u32 = 5;
pub const WORLD: u32 = 6;
pub const OK: u32 = 11;

const TOKENIZER_JSON: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [
    {"id": 0, "content": "<unk>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 1, "content": "<s>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 2, "content": "</s>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 3, "content": "<|user|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 4, "content": "<|assistant|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
  ],
  "normalizer": null,
  "pre_tokenizer": {"type": "Whitespace"},
  "post_processor": null,
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": {
      "<unk>": 0, "<s>": 1, "</s>": 2, "<|user|>": 3, "<|assistant|>": 4,
      "hello": 5, "world": 6, "what": 7, "is": 8, "rust": 9, "?": 10, "ok": 11,
      "a": 12, "language": 13
    },
    "unk_token": "<unk>"
  }
}"#;

/// `<s><|user|> {content} <|assistant|> {content} ` and so on
pub const TEMPLATE: &str = "{{ bos_token }}{% for message in messages %}<|{{ message.role }}|> {{ message.content }} {% endfor %}{% if add_generation_prompt %}<|assistant|>{% endif %}";

pub fn tokenizer() -> ChatTokenizer {
    let tokenizer = tokenizers::Tokenizer::from_str(TOKENIZER_JSON).expect("fixture tokenizer");
    let template = ChatTemplate::new(TEMPLATE, Some("<s>".to_string()), Some("</s>".to_string()))
        .expect("fixture template");
    ChatTokenizer::from_parts(tokenizer, template)
}

/// Scripted model: echoes the prompt and appends `reply`, optionally ignoring the cap.
///
/// Like llama.cpp, it stops after emitting `config.eos_token_id` and keeps it.
pub struct MockModel {
    pub device: Option<Device>,
    pub reply: Vec<u32>,
    pub respect_cap: bool,
    pub calls: RefCell<Vec<(EncodedPrompt, GenerationConfig)>>,
}

impl MockModel {
    pub fn new(reply: Vec<u32>) -> Self {
        MockModel {
            device: None,
            reply,
            respect_cap: true,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn on_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    pub fn ignoring_cap(mut self) -> Self {
        self.respect_cap = false;
        self
    }

    pub fn last_call(&self) -> (EncodedPrompt, GenerationConfig) {
        self.calls.borrow().last().cloned().expect("model was not called")
    }
}

impl Generate for MockModel {
    fn device(&self) -> Option<Device> {
        self.device
    }

    fn generate(&self, prompt: &EncodedPrompt, config: &GenerationConfig) -> Result<Vec<u32>> {
        self.calls
            .borrow_mut()
            .push((prompt.clone(), config.clone()));
        let n = if self.respect_cap {
            self.reply.len().min(config.max_new_tokens)
        } else {
            self.reply.len()
        };
        let mut output = prompt.ids().to_vec();
        for &token in &self.reply[..n] {
            output.push(token);
            if config.eos_token_id == Some(token) {
                break;
            }
        }
        Ok(output)
    }
}
