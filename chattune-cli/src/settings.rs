//! Settings configuration
//!
//! Default values are defined in `config/default.toml`; a user config file is
//! merged on top of them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chattune_engine::{Device, GenerationConfig};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default configuration TOML embedded from config/default.toml
const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub model: ModelSettings,
    pub generation: GenerationSettings,
}

/// Which model to load and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model variant id (optional, defaults to registry default)
    pub variant: Option<String>,
    /// Direct GGUF file path (overrides `variant`)
    pub gguf: Option<PathBuf>,
    /// Path to tokenizer.json (required with `gguf`)
    pub tokenizer_json: Option<PathBuf>,
    /// Path to tokenizer_config.json (required with `gguf`)
    pub tokenizer_config: Option<PathBuf>,
    /// Context window size
    pub n_ctx: u32,
    /// Number of threads for llama.cpp inference (0 = all cores, llama.cpp default)
    pub n_threads: u32,
    /// Layers offloaded to the GPU (0 = CPU only)
    pub gpu_layers: u32,
}

impl ModelSettings {
    pub fn device(&self) -> Device {
        Device::from_gpu_layers(self.gpu_layers)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub max_new_tokens: usize,
    pub do_sample: bool,
    pub temperature: f32,
    pub top_k: i32,
    pub top_p: f32,
    pub seed: Option<u32>,
}

impl GenerationSettings {
    pub fn to_config(&self) -> GenerationConfig {
        GenerationConfig {
            max_new_tokens: self.max_new_tokens,
            do_sample: self.do_sample,
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
            seed: self.seed,
            eos_token_id: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("embedded default.toml must be valid")
    }
}

/// Recursively merge `overlay` TOML values on top of `base`.
fn merge_toml(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(key) {
                    merge_toml(base_value, value);
                } else {
                    base_table.insert(key.clone(), value.clone());
                }
            }
        }
        (base, _) => {
            *base = overlay.clone();
        }
    }
}

fn parse_with_defaults(user_content: &str) -> Result<Settings> {
    let mut base: toml::Value = toml::from_str(DEFAULT_CONFIG_TOML)?;
    let user: toml::Value = toml::from_str(user_content)?;
    merge_toml(&mut base, &user);
    let settings: Settings = base.try_into()?;
    Ok(settings)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "chattune", "chattune")
}

impl Settings {
    pub fn config_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load settings from the default configuration file.
    /// Falls back to embedded default.toml if the config file does not exist.
    pub fn load() -> Result<Self> {
        let Some(config_file) = Self::config_file() else {
            warn!("Could not determine config directory, using defaults");
            return Ok(Self::default());
        };

        if !config_file.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&config_file)
    }

    /// Load settings from a specific file, merged on top of defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)?;
        parse_with_defaults(&content)
    }

    /// `load_from(path)` when a path is given, `load()` otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.model.variant.is_none());
        assert!(settings.model.gguf.is_none());
        assert_eq!(settings.model.n_ctx, 2048);
        assert_eq!(settings.model.device(), Device::Cpu);
        assert_eq!(settings.generation.max_new_tokens, 1000);
        assert!(settings.generation.do_sample);
        assert_eq!(settings.generation.seed, None);
    }

    #[test]
    fn test_default_generation_matches_engine_defaults() {
        assert_eq!(
            Settings::default().generation.to_config(),
            GenerationConfig::default()
        );
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = Settings::default();
        let toml_str = toml::to_string(&settings).unwrap();
        let loaded: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded.model.n_ctx, settings.model.n_ctx);
        assert_eq!(
            loaded.generation.max_new_tokens,
            settings.generation.max_new_tokens
        );
    }

    #[test]
    fn test_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[model]
variant = "smollm2-360m-instruct-q8"
gpu_layers = 99

[generation]
seed = 7
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(
            settings.model.variant.as_deref(),
            Some("smollm2-360m-instruct-q8")
        );
        assert_eq!(settings.model.device(), Device::Gpu { layers: 99 });
        // Untouched keys keep their defaults
        assert_eq!(settings.model.n_ctx, 2048);
        assert_eq!(settings.generation.seed, Some(7));
        assert_eq!(settings.generation.max_new_tokens, 1000);
    }

    #[test]
    fn test_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[generation]\nmax_new_tokens = \"many\"").unwrap();
        assert!(Settings::load_from(file.path()).is_err());
    }

    #[test]
    fn test_config_file_name() {
        if let Some(path) = Settings::config_file() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
