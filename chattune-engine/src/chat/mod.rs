//! Chat messages and Jinja chat templates

mod message;
mod template;

pub use message::{ChatMessage, InstructionPair, Role};
pub use template::ChatTemplate;
