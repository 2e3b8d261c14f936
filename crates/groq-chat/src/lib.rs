pub mod types;
pub mod traits;
pub mod sanitizer;
pub mod openai;
pub mod config;
pub mod groq;
pub mod error;

pub use traits::{ChatModel, ChatOptions, ModelInput, RunConfig};
pub use sanitizer::{flatten_content, sanitize, truncate_history, MessageSanitizer};
pub use openai::{OpenAIClient, OpenAIClientBuilder};
pub use config::{resolve_max_tokens, GroqConfig};
pub use groq::{GroqChat, GroqChatModel};
pub use error::ClientError;
pub use types::{Content, ContentPart, Message, Role, Tool, ToolCall, ToolChoice};
