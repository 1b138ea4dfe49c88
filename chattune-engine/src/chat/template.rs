//! Jinja chat templates, rendered the way HuggingFace `apply_chat_template` does.
//!
//! Templates come from the `chat_template` field of `tokenizer_config.json`.
//! The environment enables `trim_blocks` and `lstrip_blocks` and installs the
//! Python string-method shims from `minijinja-contrib`, which is what
//! HuggingFace templates are written against.

use std::fs;
use std::path::Path;

use minijinja::{Environment, ErrorKind, context};
use serde_json::Value;
use tracing::debug;

use super::ChatMessage;
use crate::error::{ChatError, Result};

const TEMPLATE_NAME: &str = "chat";

/// `raise_exception(msg)` as used by HuggingFace templates to reject bad conversations
fn raise_exception(msg: String) -> std::result::Result<String, minijinja::Error> {
    Err(minijinja::Error::new(ErrorKind::InvalidOperation, msg))
}

/// A compiled chat template plus the special tokens it may reference
pub struct ChatTemplate {
    env: Environment<'static>,
    bos_token: Option<String>,
    eos_token: Option<String>,
}

impl std::fmt::Debug for ChatTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatTemplate")
            .field("bos_token", &self.bos_token)
            .field("eos_token", &self.eos_token)
            .finish_non_exhaustive()
    }
}

impl ChatTemplate {
    /// Compile a template source. Syntax errors are reported here, not at render time.
    pub fn new(
        source: impl Into<String>,
        bos_token: Option<String>,
        eos_token: Option<String>,
    ) -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        env.add_function("raise_exception", raise_exception);
        env.add_template_owned(TEMPLATE_NAME, source.into())?;

        Ok(ChatTemplate {
            env,
            bos_token,
            eos_token,
        })
    }

    /// Load `chat_template`, `bos_token` and `eos_token` from a `tokenizer_config.json`.
    pub fn from_tokenizer_config<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading chat template from {:?}", path);
        let content = fs::read_to_string(path)?;
        let config: Value =
            serde_json::from_str(&content).map_err(|source| ChatError::TokenizerConfig {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_config_value(&config, &path.display().to_string())
    }

    /// Same as [`Self::from_tokenizer_config`] for an already parsed config.
    ///
    /// `origin` names the config in the `MissingChatTemplate` error.
    pub fn from_config_value(config: &Value, origin: &str) -> Result<Self> {
        let source = config
            .get("chat_template")
            .and_then(template_source)
            .ok_or_else(|| ChatError::MissingChatTemplate(origin.to_string()))?;

        Self::new(
            source,
            config.get("bos_token").and_then(token_content),
            config.get("eos_token").and_then(token_content),
        )
    }

    pub fn bos_token(&self) -> Option<&str> {
        self.bos_token.as_deref()
    }

    pub fn eos_token(&self) -> Option<&str> {
        self.eos_token.as_deref()
    }

    /// Render a conversation to a single string.
    ///
    /// With `add_generation_prompt` the template appends the opening of an
    /// assistant turn so the model continues as the assistant.
    pub fn render(&self, messages: &[ChatMessage], add_generation_prompt: bool) -> Result<String> {
        let tmpl = self.env.get_template(TEMPLATE_NAME)?;
        let rendered = tmpl.render(context! {
            messages => messages,
            add_generation_prompt => add_generation_prompt,
            bos_token => self.bos_token.as_deref().unwrap_or_default(),
            eos_token => self.eos_token.as_deref().unwrap_or_default(),
        })?;
        Ok(rendered)
    }
}

/// `chat_template` is either a string or a list of `{name, template}` entries.
fn template_source(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(entries) => entries
            .iter()
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some("default"))
            .and_then(|entry| entry.get("template"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Special tokens are either a string or an added-token object with `content`.
fn token_content(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("content").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
