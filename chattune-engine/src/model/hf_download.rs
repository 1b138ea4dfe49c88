//! HuggingFace model download utilities
//!
//! Downloads GGUF weights and tokenizer files from HuggingFace Hub and caches them locally.
//! Model definitions are loaded from `models.toml` via [`super::model_config`].

use super::model_config::{ModelFamily, VariantConfig};
use crate::error::{ChatError, Result};
use hf_hub::{Repo, RepoType, api::sync::ApiBuilder};
use std::path::PathBuf;

pub const TOKENIZER_JSON: &str = "tokenizer.json";
pub const TOKENIZER_CONFIG_JSON: &str = "tokenizer_config.json";

/// Download a file from a HuggingFace model repository
///
/// Returns the local path; files are cached under `~/.cache/huggingface/hub/`.
///
/// # Environment Variables
/// * `HF_TOKEN` - HuggingFace API token (required for gated or private repositories)
pub fn download_file(repo_id: &str, filename: &str) -> Result<PathBuf> {
    let mut builder = ApiBuilder::new();
    if let Ok(token) = std::env::var("HF_TOKEN") {
        builder = builder.with_token(Some(token));
    }
    let api = builder.build().map_err(|e| ChatError::Download(e.into()))?;

    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    tracing::info!("Downloading {} from {}...", filename, repo_id);

    let path = repo
        .get(filename)
        .map_err(|e| ChatError::Download(e.into()))?;

    tracing::info!("Downloaded to {:?}", path);

    Ok(path)
}

/// Get local path for a variant's GGUF, downloading if not cached.
pub fn get_variant_path(family: &ModelFamily, variant: &VariantConfig) -> Result<PathBuf> {
    download_file(&family.repo_id, &variant.filename)
}

pub fn get_tokenizer_path(family: &ModelFamily) -> Result<PathBuf> {
    download_file(family.tokenizer_repo(), TOKENIZER_JSON)
}

pub fn get_tokenizer_config_path(family: &ModelFamily) -> Result<PathBuf> {
    download_file(family.tokenizer_repo(), TOKENIZER_CONFIG_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::model_config::registry;

    #[test]
    fn test_tokenizer_files_come_from_tokenizer_repo() {
        let (family, _variant) = registry()
            .find_variant("qwen2.5-0.5b-instruct-q4")
            .expect("variant not found");
        assert_ne!(family.tokenizer_repo(), family.repo_id);
        assert_eq!(TOKENIZER_JSON, "tokenizer.json");
        assert_eq!(TOKENIZER_CONFIG_JSON, "tokenizer_config.json");
    }
}
