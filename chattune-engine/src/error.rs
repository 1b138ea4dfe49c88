//! Error types for dataset preparation and generation

/// Errors that can occur while templating, tokenizing, or generating.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("unknown model variant: '{0}'")]
    UnknownVariant(String),

    #[error("download failed")]
    Download(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("model load failed")]
    ModelLoad(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("tokenizer load failed")]
    TokenizerLoad(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid tokenizer config {path}")]
    TokenizerConfig {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no chat template found in {0}")]
    MissingChatTemplate(String),

    #[error("chat template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("inference failed")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid JSON record on line {line}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
