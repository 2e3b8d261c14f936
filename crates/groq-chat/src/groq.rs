use crate::config::GroqConfig;
use crate::openai::OpenAIClient;
use crate::sanitizer::MessageSanitizer;
use anyhow::Result;

/// Chat model for Groq: an [`OpenAIClient`] behind a [`MessageSanitizer`]
pub type GroqChatModel = MessageSanitizer<OpenAIClient>;

/// Factory for Groq chat models
pub struct GroqChat;

impl GroqChat {
    /// Build a sanitized Groq client from configuration.
    ///
    /// The model's context budget (or the configured override) becomes the
    /// default `max_tokens` of every request.
    pub fn from_config(config: GroqConfig) -> Result<GroqChatModel> {
        let max_tokens = config.effective_max_tokens();

        let mut builder = OpenAIClient::builder()
            .api_key(config.api_key.clone())
            .base_url(config.base_url.clone())
            .model(config.model.clone())
            .max_tokens(max_tokens);
        if let Some(temperature) = config.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        tracing::debug!(model = %config.model, max_tokens, "groq chat model ready");

        Ok(MessageSanitizer::with_model(client, config.model, config.max_tokens))
    }

    /// Build from `config/groq.toml` and `GROQ_*` environment variables
    pub fn from_env() -> Result<GroqChatModel> {
        Self::from_config(GroqConfig::load()?)
    }
}
