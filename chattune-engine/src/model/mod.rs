//! Causal LM inference using llama.cpp GGUF models

mod backend;
pub mod hf_download;
pub mod llamacpp;
pub mod model_config;

use crate::error::Result;
use crate::generate::GenerationConfig;
use crate::tokenizer::EncodedPrompt;

pub use backend::ModelFiles;
pub use hf_download::{
    download_file, get_tokenizer_config_path, get_tokenizer_path, get_variant_path,
};
pub use llamacpp::LlamaCppModel;
pub use model_config::{ModelFamily, ModelRegistry, VariantConfig, registry};

/// Where model weights (and therefore staged prompts) live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Device {
    #[default]
    Cpu,
    /// Offload `layers` transformer layers to the GPU
    Gpu { layers: u32 },
}

impl Device {
    /// Device for a llama.cpp `n_gpu_layers` setting (0 = CPU only).
    pub fn from_gpu_layers(layers: u32) -> Self {
        if layers == 0 {
            Device::Cpu
        } else {
            Device::Gpu { layers }
        }
    }

    pub fn gpu_layers(&self) -> u32 {
        match self {
            Device::Cpu => 0,
            Device::Gpu { layers } => *layers,
        }
    }
}

/// A model that continues a tokenized prompt.
pub trait Generate {
    /// Device the model runs on, if placement matters for its inputs.
    fn device(&self) -> Option<Device>;

    /// Generate a continuation of `prompt`.
    ///
    /// Returns the prompt ids followed by at most `config.max_new_tokens` new ids.
    fn generate(&self, prompt: &EncodedPrompt, config: &GenerationConfig) -> Result<Vec<u32>>;
}

impl<G: Generate + ?Sized> Generate for &G {
    fn device(&self) -> Option<Device> {
        (**self).device()
    }

    fn generate(&self, prompt: &EncodedPrompt, config: &GenerationConfig) -> Result<Vec<u32>> {
        (**self).generate(prompt, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_from_gpu_layers() {
        assert_eq!(Device::from_gpu_layers(0), Device::Cpu);
        assert_eq!(Device::from_gpu_layers(12), Device::Gpu { layers: 12 });
        assert_eq!(Device::Gpu { layers: 7 }.gpu_layers(), 7);
        assert_eq!(Device::default().gpu_layers(), 0);
    }
}
