use crate::types::{Message, Tool, ToolChoice};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Chat model capability: one blocking and one async entrypoint.
///
/// Implemented by the HTTP client ([`crate::OpenAIClient`]) and by
/// [`crate::MessageSanitizer`], which wraps any other implementation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Blocking completion
    fn invoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message>;

    /// Async completion
    async fn ainvoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message>;
}

#[async_trait]
impl<M: ChatModel + ?Sized> ChatModel for Arc<M> {
    fn invoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message> {
        (**self).invoke(input, config, options)
    }

    async fn ainvoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message> {
        (**self).ainvoke(input, config, options).await
    }
}

/// What a caller hands to a [`ChatModel`]: one message or a whole conversation
#[derive(Debug, Clone, PartialEq)]
pub enum ModelInput {
    Single(Message),
    Conversation(Vec<Message>),
}

impl ModelInput {
    /// Messages in request order
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            Self::Single(message) => vec![message],
            Self::Conversation(messages) => messages,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Conversation(messages) => messages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Message> for ModelInput {
    fn from(message: Message) -> Self {
        Self::Single(message)
    }
}

impl From<Vec<Message>> for ModelInput {
    fn from(messages: Vec<Message>) -> Self {
        Self::Conversation(messages)
    }
}

impl From<&str> for ModelInput {
    fn from(text: &str) -> Self {
        Self::Single(Message::user(text))
    }
}

/// Per-run configuration, passed through untouched to the downstream model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_name(mut self, name: impl Into<String>) -> Self {
        self.run_name = Some(name.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Per-call request parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stop: Option<Vec<String>>,
    pub tools: Option<Vec<Tool>>,
    pub tool_choice: Option<ToolChoice>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Fill every unset field from `defaults`; fields set on `self` win
    pub fn or(self, defaults: &ChatOptions) -> Self {
        Self {
            temperature: self.temperature.or(defaults.temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            stop: self.stop.or_else(|| defaults.stop.clone()),
            tools: self.tools.or_else(|| defaults.tools.clone()),
            tool_choice: self.tool_choice.or_else(|| defaults.tool_choice.clone()),
        }
    }
}
