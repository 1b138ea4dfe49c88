//! Resolve model and tokenizer files from settings

use anyhow::{Context, Result, bail};
use chattune_engine::model::registry;
use chattune_engine::{ChatTokenizer, LlamaCppModel, ModelFiles};
use tracing::info;

use crate::settings::ModelSettings;

fn variant_id(settings: &ModelSettings) -> &str {
    settings
        .variant
        .as_deref()
        .unwrap_or(&registry().default_model)
}

/// Load only the chat tokenizer.
///
/// Local `tokenizer_json` + `tokenizer_config` paths take precedence over a
/// registry download, and no GGUF is fetched.
pub fn load_tokenizer(settings: &ModelSettings) -> Result<ChatTokenizer> {
    match (&settings.tokenizer_json, &settings.tokenizer_config) {
        (Some(json), Some(config)) => ChatTokenizer::from_files(json, config).with_context(|| {
            format!(
                "Failed to load tokenizer from {} and {}",
                json.display(),
                config.display()
            )
        }),
        (None, None) => {
            let id = variant_id(settings);
            let (family, _variant) = registry()
                .find_variant(id)
                .with_context(|| format!("unknown model variant: '{}'", id))?;
            let json = chattune_engine::model::get_tokenizer_path(family)?;
            let config = chattune_engine::model::get_tokenizer_config_path(family)?;
            Ok(ChatTokenizer::from_files(&json, &config)?)
        }
        _ => bail!("--tokenizer-json and --tokenizer-config must be given together"),
    }
}

/// Resolve the GGUF and tokenizer files, downloading registry models as needed.
pub fn resolve_files(settings: &ModelSettings) -> Result<ModelFiles> {
    if let Some(gguf) = &settings.gguf {
        let (Some(json), Some(config)) = (&settings.tokenizer_json, &settings.tokenizer_config)
        else {
            bail!("--tokenizer-json and --tokenizer-config are required when using --gguf");
        };
        return Ok(ModelFiles::from_paths(gguf, json, config));
    }

    let id = variant_id(settings);
    info!("Downloading/loading model variant: {} ...", id);
    let files = ModelFiles::from_variant_id(id)?;
    info!("Model path: {}", files.gguf.display());
    Ok(files)
}

/// Load the model and tokenizer described by `settings`.
pub fn load_model(settings: &ModelSettings) -> Result<(LlamaCppModel, ChatTokenizer)> {
    let files = resolve_files(settings)?;
    let tokenizer = files.load_tokenizer().context("Failed to load tokenizer")?;
    let mut model = files
        .load_model(settings.device(), settings.n_ctx)
        .with_context(|| format!("Failed to load GGUF from {}", files.gguf.display()))?;
    model.set_n_threads(settings.n_threads);
    info!("Loaded {}", files.display_name);
    Ok((model, tokenizer))
}
