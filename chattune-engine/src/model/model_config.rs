//! TOML-based model configuration
//!
//! Supported GGUF chat models are defined in `models.toml` at the crate root.
//! This module deserializes that file and provides a global registry for lookup.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Top-level config parsed from `models.toml`
#[derive(Debug, Deserialize)]
pub struct ModelRegistry {
    /// Default variant id (e.g. "qwen2.5-0.5b-instruct-q4")
    pub default_model: String,
    /// Model families keyed by short name
    pub models: HashMap<String, ModelFamily>,
}

/// A model family (one GGUF repo, multiple quantisation variants)
#[derive(Debug, Deserialize)]
pub struct ModelFamily {
    pub repo_id: String,
    pub display_name: String,
    /// Repo holding `tokenizer.json` / `tokenizer_config.json` (defaults to `repo_id`)
    #[serde(default)]
    pub tokenizer_repo: Option<String>,
    /// Quantisation variants keyed by short name (e.g. "q4", "q8")
    pub variants: HashMap<String, VariantConfig>,
}

impl ModelFamily {
    pub fn tokenizer_repo(&self) -> &str {
        self.tokenizer_repo.as_deref().unwrap_or(&self.repo_id)
    }
}

/// A single downloadable GGUF variant
#[derive(Debug, Deserialize)]
pub struct VariantConfig {
    /// Unique variant id (e.g. "qwen2.5-0.5b-instruct-q4")
    pub id: String,
    /// GGUF filename in the HuggingFace repo
    pub filename: String,
    pub display_name: String,
}

static REGISTRY: OnceLock<ModelRegistry> = OnceLock::new();

/// Return the global model registry, parsed once from the embedded `models.toml`.
pub fn registry() -> &'static ModelRegistry {
    REGISTRY.get_or_init(|| {
        let toml_str = include_str!("../../models.toml");
        toml::from_str(toml_str).expect("Failed to parse models.toml")
    })
}

impl ModelRegistry {
    /// Look up a variant by its unique id.
    pub fn find_variant(&self, variant_id: &str) -> Option<(&ModelFamily, &VariantConfig)> {
        self.iter_variants().find(|(_, variant)| variant.id == variant_id)
    }

    pub fn default_variant(&self) -> Option<(&ModelFamily, &VariantConfig)> {
        self.find_variant(&self.default_model)
    }

    pub fn all_variant_ids(&self) -> Vec<&str> {
        self.iter_variants().map(|(_, v)| v.id.as_str()).collect()
    }

    pub fn iter_variants(&self) -> impl Iterator<Item = (&ModelFamily, &VariantConfig)> {
        self.models
            .values()
            .flat_map(|f| f.variants.values().map(move |v| (f, v)))
    }
}
