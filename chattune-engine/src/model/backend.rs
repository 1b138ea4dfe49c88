//! Resolve the files a chat model needs and load them

use std::path::{Path, PathBuf};

use super::hf_download::{get_tokenizer_config_path, get_tokenizer_path, get_variant_path};
use super::llamacpp::LlamaCppModel;
use super::model_config::{ModelFamily, VariantConfig, registry};
use super::Device;
use crate::error::{ChatError, Result};
use crate::tokenizer::ChatTokenizer;

/// Local paths for a GGUF model and its tokenizer files
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub gguf: PathBuf,
    pub tokenizer_json: PathBuf,
    pub tokenizer_config: PathBuf,
    /// Display name for the model (variant id for registry models, "custom" for GGUF paths)
    pub display_name: String,
}

impl ModelFiles {
    /// Use files already on disk.
    pub fn from_paths(gguf: &Path, tokenizer_json: &Path, tokenizer_config: &Path) -> Self {
        ModelFiles {
            gguf: gguf.to_path_buf(),
            tokenizer_json: tokenizer_json.to_path_buf(),
            tokenizer_config: tokenizer_config.to_path_buf(),
            display_name: "custom".to_string(),
        }
    }

    /// Download the GGUF and tokenizer files for a `(ModelFamily, VariantConfig)` pair.
    pub fn from_variant(family: &ModelFamily, variant: &VariantConfig) -> Result<Self> {
        Ok(ModelFiles {
            gguf: get_variant_path(family, variant)?,
            tokenizer_json: get_tokenizer_path(family)?,
            tokenizer_config: get_tokenizer_config_path(family)?,
            display_name: variant.id.clone(),
        })
    }

    /// Look up a variant id in the global registry and download its files.
    ///
    /// E.g. `ModelFiles::from_variant_id("qwen2.5-0.5b-instruct-q4")`
    pub fn from_variant_id(variant_id: &str) -> Result<Self> {
        let (family, variant) = registry()
            .find_variant(variant_id)
            .ok_or_else(|| ChatError::UnknownVariant(variant_id.to_string()))?;
        Self::from_variant(family, variant)
    }

    pub fn load_tokenizer(&self) -> Result<ChatTokenizer> {
        ChatTokenizer::from_files(&self.tokenizer_json, &self.tokenizer_config)
    }

    pub fn load_model(&self, device: Device, n_ctx: u32) -> Result<LlamaCppModel> {
        LlamaCppModel::from_file_with_n_ctx(&self.gguf, device, n_ctx)
    }
}
