// Message pre-processing for providers without multimodal input and with small
// context windows. Wraps any ChatModel and rewrites the input before delegating.

use crate::config::{resolve_max_tokens, DEFAULT_MODEL};
use crate::traits::{ChatModel, ChatOptions, ModelInput, RunConfig};
use crate::types::{Content, Message};
use anyhow::Result;
use async_trait::async_trait;

/// Conversations this short are never truncated
pub const MIN_MESSAGES_FOR_TRUNCATION: usize = 3;

/// How many non-system messages survive truncation
pub const RECENT_MESSAGES_KEPT: usize = 4;

/// Flattens multimodal content and trims history before calling `inner`.
///
/// Stateless between calls: every call works on the input it was given.
#[derive(Debug, Clone)]
pub struct MessageSanitizer<M> {
    inner: M,
    model: String,
    max_tokens: u32,
}

impl<M: ChatModel> MessageSanitizer<M> {
    /// Wrap `inner`, using the default model's context budget
    pub fn new(inner: M) -> Self {
        Self::with_model(inner, DEFAULT_MODEL, None)
    }

    /// Wrap `inner` for `model`; an explicit `max_tokens` overrides the model default
    pub fn with_model(inner: M, model: impl Into<String>, max_tokens: Option<u32>) -> Self {
        let model = model.into();
        let max_tokens = resolve_max_tokens(&model, max_tokens);
        Self {
            inner,
            model,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Effective token budget for this model
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

/// Replace structured content with the concatenation of its text parts.
///
/// Plain-text messages come back unchanged. Image and unknown parts are
/// dropped without error.
pub fn flatten_content(message: Message) -> Message {
    let dropped = match &message.content {
        Content::Text(_) => return message,
        Content::Parts(parts) => parts.iter().filter(|part| !part.is_text()).count(),
    };
    if dropped > 0 {
        tracing::debug!(role = %message.role, dropped, "dropping non-text content parts");
    }

    let text = message.content.joined_text();
    Message {
        content: Content::Text(text),
        ..message
    }
}

/// Keep a leading system message plus the most recent exchanges.
///
/// Counts messages, not tokens.
pub fn truncate_history(mut messages: Vec<Message>) -> Vec<Message> {
    if messages.len() < MIN_MESSAGES_FOR_TRUNCATION {
        return messages;
    }

    let system = if messages[0].is_system() {
        Some(messages.remove(0))
    } else {
        None
    };

    if messages.len() > RECENT_MESSAGES_KEPT {
        let excess = messages.len() - RECENT_MESSAGES_KEPT;
        tracing::debug!(discarded = excess, "truncating conversation history");
        messages.drain(..excess);
    }

    match system {
        Some(system) => {
            messages.insert(0, system);
            messages
        }
        None => messages,
    }
}

/// Flatten a single message, or flatten and truncate a conversation
pub fn sanitize(input: ModelInput) -> ModelInput {
    match input {
        ModelInput::Single(message) => ModelInput::Single(flatten_content(message)),
        ModelInput::Conversation(messages) => {
            let flattened = messages.into_iter().map(flatten_content).collect();
            ModelInput::Conversation(truncate_history(flattened))
        }
    }
}

#[async_trait]
impl<M: ChatModel> ChatModel for MessageSanitizer<M> {
    fn invoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message> {
        self.inner.invoke(sanitize(input), config, options)
    }

    async fn ainvoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message> {
        self.inner.ainvoke(sanitize(input), config, options).await
    }
}
