//! Command-line flags shared by the binaries

use std::path::PathBuf;

use clap::Args;

use crate::settings::ModelSettings;

/// Model selection flags; each one overrides the config file when given
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// Model variant id from models.toml (e.g. qwen2.5-0.5b-instruct-q4)
    #[arg(long)]
    pub model: Option<String>,

    /// Direct GGUF file path (overrides --model)
    #[arg(long)]
    pub gguf: Option<PathBuf>,

    /// Path to tokenizer.json (required when using --gguf)
    #[arg(long)]
    pub tokenizer_json: Option<PathBuf>,

    /// Path to tokenizer_config.json holding the chat template (required when using --gguf)
    #[arg(long)]
    pub tokenizer_config: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ModelArgs {
    pub fn apply(&self, settings: &mut ModelSettings) {
        if let Some(model) = &self.model {
            settings.variant = Some(model.clone());
        }
        if let Some(gguf) = &self.gguf {
            settings.gguf = Some(gguf.clone());
        }
        if let Some(path) = &self.tokenizer_json {
            settings.tokenizer_json = Some(path.clone());
        }
        if let Some(path) = &self.tokenizer_config {
            settings.tokenizer_config = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let mut settings = Settings::default().model;
        settings.variant = Some("from-config".to_string());
        settings.tokenizer_json = Some(PathBuf::from("config-tokenizer.json"));

        let args = ModelArgs {
            tokenizer_json: Some(PathBuf::from("cli-tokenizer.json")),
            ..ModelArgs::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.variant.as_deref(), Some("from-config"));
        assert_eq!(
            settings.tokenizer_json,
            Some(PathBuf::from("cli-tokenizer.json"))
        );
        assert!(settings.gguf.is_none());
    }
}
