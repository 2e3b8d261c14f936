// Client for OpenAI-compatible /chat/completions endpoints (Groq, OpenAI, ...)

use crate::config::GROQ_API_BASE;
use crate::error::ClientError;
use crate::traits::{ChatModel, ChatOptions, ModelInput, RunConfig};
use crate::types::{Content, ContentPart, Message, Role, ToolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::Instrument;

/// OpenAI-compatible chat client (HTTP direct, no SDK)
///
/// Sends exactly the messages it is given; no content rewriting happens here.
#[derive(Debug)]
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    defaults: ChatOptions,
    /// Runtime backing [`ChatModel::invoke`], created on first blocking call
    blocking_runtime: OnceLock<tokio::runtime::Runtime>,
}

impl OpenAIClient {
    pub fn builder() -> OpenAIClientBuilder {
        OpenAIClientBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Options applied when a call leaves a field unset
    pub fn defaults(&self) -> &ChatOptions {
        &self.defaults
    }

    /// Build chat completion request payload
    fn build_chat_request(&self, messages: Vec<Message>, options: &ChatOptions) -> Result<Value> {
        let messages: Vec<Value> = messages.into_iter().map(convert_message).collect();

        let mut request = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(obj) = request.as_object_mut() {
            if let Some(temp) = options.temperature {
                obj.insert("temperature".to_string(), json!(temp));
            }
            if let Some(max_tokens) = options.max_tokens {
                obj.insert("max_tokens".to_string(), json!(max_tokens));
            }
            if let Some(stop) = &options.stop {
                obj.insert("stop".to_string(), json!(stop));
            }
            if let Some(tools) = &options.tools {
                obj.insert("tools".to_string(), serde_json::to_value(tools)?);
            }
            if let Some(tool_choice) = &options.tool_choice {
                obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
            }
        }

        Ok(request)
    }

    async fn send(&self, messages: Vec<Message>, options: ChatOptions) -> Result<Message> {
        let options = options.or(&self.defaults);
        let payload = self.build_chat_request(messages, &options)?;

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body }.into());
        }

        let raw: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        if let Some(usage) = &raw.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "chat completion finished"
            );
        }

        let choice = raw
            .choices
            .into_iter()
            .next()
            .ok_or(ClientError::EmptyResponse)?;

        tracing::debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            tool_calls = choice.message.tool_calls.as_ref().map_or(0, Vec::len),
            "chat completion choice received"
        );

        Ok(Message {
            content: Content::Text(choice.message.content.unwrap_or_default()),
            tool_calls: choice.message.tool_calls,
            ..Message::assistant("")
        })
    }

    fn blocking_runtime(&self) -> Result<&tokio::runtime::Runtime> {
        if let Some(runtime) = self.blocking_runtime.get() {
            return Ok(runtime);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create blocking runtime")?;
        Ok(self.blocking_runtime.get_or_init(|| runtime))
    }
}

impl Drop for OpenAIClient {
    fn drop(&mut self) {
        // A plain Runtime drop panics when it happens inside another runtime
        if let Some(runtime) = self.blocking_runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Convert a message to the wire format
fn convert_message(message: Message) -> Value {
    let mut obj = Map::new();
    obj.insert("role".to_string(), json!(message.role.as_str()));

    let has_tool_calls = message.tool_calls.is_some();
    let content = match message.content {
        // Assistant turns that only carry tool calls have null content
        Content::Text(text) if text.is_empty() && has_tool_calls => Value::Null,
        content => convert_content(content),
    };
    obj.insert("content".to_string(), content);

    if let Some(name) = message.name {
        obj.insert("name".to_string(), json!(name));
    }
    if let Some(tool_calls) = message.tool_calls {
        obj.insert("tool_calls".to_string(), json!(tool_calls));
    }
    if message.role == Role::Tool {
        if let Some(tool_call_id) = message.tool_call_id {
            obj.insert("tool_call_id".to_string(), json!(tool_call_id));
        }
    }

    Value::Object(obj)
}

/// Convert Content to the wire format (string or array)
fn convert_content(content: Content) -> Value {
    match content {
        Content::Text(s) => json!(s),
        Content::Parts(parts) => {
            let converted: Vec<Value> = parts
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(json!({ "type": "text", "text": text })),
                    ContentPart::Image { url } => {
                        Some(json!({ "type": "image_url", "image_url": { "url": url } }))
                    }
                    ContentPart::ImageUrl { image_url } => {
                        Some(json!({ "type": "image_url", "image_url": image_url }))
                    }
                    ContentPart::Unsupported => None,
                })
                .collect();
            json!(converted)
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    /// Runs [`ChatModel::ainvoke`] on a private runtime.
    ///
    /// Errors if called from within an async runtime; use `ainvoke` there.
    fn invoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message> {
        if tokio::runtime::Handle::try_current().is_ok() {
            anyhow::bail!("invoke() cannot block inside an async runtime; use ainvoke()");
        }
        self.blocking_runtime()?
            .block_on(self.ainvoke(input, config, options))
    }

    async fn ainvoke(
        &self,
        input: ModelInput,
        config: Option<RunConfig>,
        options: ChatOptions,
    ) -> Result<Message> {
        let config = config.unwrap_or_default();
        let span = tracing::info_span!(
            "chat_completion",
            model = %self.model,
            run_name = config.run_name.as_deref().unwrap_or(""),
            tags = ?config.tags,
        );

        self.send(input.into_messages(), options)
            .instrument(span)
            .await
    }
}

/// Builder for OpenAIClient
#[derive(Default)]
pub struct OpenAIClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    defaults: ChatOptions,
    timeout: Option<Duration>,
}

impl OpenAIClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Base URL of the API, defaults to Groq's OpenAI-compatible endpoint
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Default `max_tokens` for every request
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.defaults.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.defaults.temperature = Some(temperature);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<OpenAIClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or(ClientError::MissingSetting("API key"))?;
        let model = self.model.ok_or(ClientError::MissingSetting("model"))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| GROQ_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| ClientError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let mut http_client = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            http_client = http_client.timeout(timeout);
        }
        let http_client = http_client.build().context("Failed to create HTTP client")?;

        Ok(OpenAIClient {
            http_client,
            base_url,
            model,
            defaults: self.defaults,
            blocking_runtime: OnceLock::new(),
        })
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
