pub mod chat;
pub mod dataset;
pub mod error;
pub mod generate;
pub mod model;
pub mod tokenizer;

pub use chat::{ChatMessage, ChatTemplate, InstructionPair, Role};
pub use dataset::{Dataset, TextRecord, get_dataset, get_dataset_in, read_pairs, write_jsonl};
pub use error::{ChatError, Result};
pub use generate::{GenerationConfig, MAX_NEW_TOKENS, generate_from_prompt, generate_with_config};
pub use model::{Device, Generate, LlamaCppModel, ModelFiles};
pub use tokenizer::{ChatTokenizer, EncodedPrompt};
